use radialpf::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), PfError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let regions = match std::env::args().nth(1) {
        Some(path) => RegionTable::from_path(path)?,
        None => RegionTable::builtin()?,
    };

    for name in regions.names() {
        let case = regions.get(name)?;
        println!("## {name}\n");

        let net = case.network()?;
        let res = net.run_pf_with(&case.solver)?;
        match res.status {
            ConvergenceStatus::Converged(k) => println!("Converged in {k} iterations.\n"),
            ConvergenceStatus::IterationsExhausted => println!(
                "Did not converge within {} iterations.\n",
                res.iterations
            ),
        }
        (&net, &res).print_res_bus();
        println!();

        if let Some(cmp) = case.losses.comparison()? {
            println!("{}\n", format_loss_comparison(&cmp));
        }

        let series = case.losses.projection()?;
        println!("{}\n", format_loss_series(&series));
        write_loss_series_csv(&series, std::io::stdout().lock())?;
        println!();
    }
    Ok(())
}
