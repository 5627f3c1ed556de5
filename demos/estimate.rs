use convord::{
    estimate::{ estimate, mean_order },
    sample::{ GridSample, Norm, TestSeries },
};

// observed orders for a manufactured fourth-order series whose finest grid has
// hit round-off

fn main() {
    let hs = [0.1, 0.05, 0.025, 0.0125];
    let c: f64 = 7.5e-1;
    let samples
        = hs.iter()
        .map(|&h: &f64| {
            // past this point the error stalls at the round-off floor
            let e = (c * h.powi(4)).max(2e-7);
            GridSample::new(h, e, 3.0 * e).unwrap()
        });
    let series = TestSeries::from_samples("BrillWave", samples).unwrap();

    let orders = estimate(&series);
    for est in orders.iter() {
        println!(
            "{:.4} -> {:.4}: L2 {:.3}, Linf {:.3}",
            est.h1, est.h2, est.l2, est.linf,
        );
    }
    println!(
        "mean L2 order: {:.3}",
        mean_order(&orders, Norm::L2).unwrap_or(f64::NAN),
    );
}
