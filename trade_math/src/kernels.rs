//! Kernel functions for kernel-based regression

/// Radial basis function kernel on scalar inputs: `exp(-gamma * (a - b)^2)`
#[inline]
pub fn rbf(a: f64, b: f64, gamma: f64) -> f64 {
    let d = a - b;
    (-gamma * d * d).exp()
}

/// Dense RBF Gram matrix for `xs`, stored row-major.
pub fn rbf_gram(xs: &[f64], gamma: f64) -> Vec<f64> {
    let n = xs.len();
    let mut gram = vec![0.0; n * n];
    for i in 0..n {
        gram[i * n + i] = 1.0;
        for j in (i + 1)..n {
            let k = rbf(xs[i], xs[j], gamma);
            gram[i * n + j] = k;
            gram[j * n + i] = k;
        }
    }
    gram
}
