//! Recovery of known effects from simulated data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use epi_stats::{CoxConfig, Design, LogitConfig, fit_cox, fit_logit, fit_ols};

fn normal(rng: &mut StdRng) -> f64 {
    // Box-Muller
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

#[test]
fn ols_recovers_slopes() {
    let mut rng = StdRng::seed_from_u64(11);
    let n = 400;
    let x: Vec<f64> = (0..n).map(|_| normal(&mut rng)).collect();
    let z: Vec<f64> = (0..n).map(|_| normal(&mut rng)).collect();
    let y: Vec<f64> = x
        .iter()
        .zip(&z)
        .map(|(x, z)| 0.5 + 1.5 * x - 0.8 * z + 0.3 * normal(&mut rng))
        .collect();
    let design = Design::from_columns(&[("x".to_string(), x), ("z".to_string(), z)])
        .unwrap()
        .with_intercept();

    let fit = fit_ols(&design, &y).unwrap();

    assert_eq!(fit.df_resid, n - 3);
    let slope = &fit.coefficients[1];
    assert!(slope.lower_ci < 1.5 && 1.5 < slope.upper_ci);
    assert!((fit.coefficients[2].coef + 0.8).abs() < 0.1);
}

#[test]
fn logit_recovers_log_odds() {
    let mut rng = StdRng::seed_from_u64(42);
    let n = 3000;
    let x: Vec<f64> = (0..n).map(|_| normal(&mut rng)).collect();
    let y: Vec<f64> = x
        .iter()
        .map(|x| {
            let p = 1.0 / (1.0 + (-(-1.0 + 0.6 * x)).exp());
            if rng.random::<f64>() < p { 1.0 } else { 0.0 }
        })
        .collect();
    let design = Design::from_columns(&[("x".to_string(), x)])
        .unwrap()
        .with_intercept();

    let fit = fit_logit(&design, &y, LogitConfig::default()).unwrap();

    let slope = &fit.coefficients[1];
    assert!((slope.coef - 0.6).abs() < 0.15, "slope {}", slope.coef);
    assert!(slope.p_value < 1e-6);
}

#[test]
fn cox_recovers_log_hazard_ratio() {
    let mut rng = StdRng::seed_from_u64(7);
    let n = 2000;
    let x: Vec<f64> = (0..n).map(|_| normal(&mut rng)).collect();
    let mut time = Vec::with_capacity(n);
    let mut event = Vec::with_capacity(n);
    for value in &x {
        let u: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
        let failure = -u.ln() / (0.7 * value).exp();
        let censor = 2.0 * rng.random::<f64>();
        // Rounded times create ties.
        time.push((failure.min(censor) * 100.0).round() / 100.0);
        event.push(failure <= censor);
    }
    let design = Design::from_columns(&[("x".to_string(), x)]).unwrap();

    let fit = fit_cox(&design, &time, &event, CoxConfig::default()).unwrap();

    let row = fit.term("x").unwrap();
    assert!((row.coef - 0.7).abs() < 0.15, "coef {}", row.coef);
    assert!((row.exp_coef - row.coef.exp()).abs() < 1e-12);
    assert!(fit.n_events > 0 && fit.n_events < n);
}
