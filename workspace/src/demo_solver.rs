// stand-in for a validation solver: prints manufactured errors e = C h^p for a
// few test cases in the `RESULTS:` line format, for smoke-testing live runs
//
// usage: demo_solver [--order=<p>] --h=<h>

use anyhow::{ anyhow, bail, Context };

// (name, L2 constant, Linf constant); zero constants give exact solutions
const TESTS: &[(&str, f64, f64)] = &[
    ("Minkowski", 0.0, 0.0),
    ("Schwarzschild", 1.3, 4.1),
    ("Kerr", 2.7, 9.5),
];

fn flag(args: &[String], name: &str) -> anyhow::Result<Option<f64>> {
    let prefix = format!("--{}=", name);
    args.iter()
        .find_map(|arg| arg.strip_prefix(&prefix))
        .map(|val| {
            val.parse::<f64>()
                .with_context(|| format!("invalid value for --{}: {}", name, val))
        })
        .transpose()
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let h = flag(&args, "h")?.ok_or_else(|| anyhow!("missing --h=<float>"))?;
    let p = flag(&args, "order")?.unwrap_or(2.0);
    if !(h.is_finite() && h > 0.0) { bail!("grid spacing must be positive; got {}", h); }

    println!("demo_solver: h = {}, order = {}", h, p);
    for &(name, c2, cinf) in TESTS.iter() {
        println!(
            "RESULTS: {} L2={:e} Linf={:e}",
            name, c2 * h.powf(p), cinf * h.powf(p),
        );
    }
    Ok(())
}
