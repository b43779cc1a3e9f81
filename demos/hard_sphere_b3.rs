use rand::prelude::*;
use std::f64::consts::PI;
use virial::cluster::*;
use virial::configuration::CoordinatePairSet;
use virial::mayer::MayerHardSphere;

/// Estimate the hard sphere virial coefficient B_n by sampling points 1..n uniformly in a cube
/// around point 0 and averaging the cluster value.
fn estimate_bn(n: usize, half_width: f64, samples: usize, rng: &mut SmallRng) -> f64 {
    let mut cluster = ClusterWheatley::new(n, MayerHardSphere::new(1.0)).unwrap();
    let mut pairs = CoordinatePairSet::at_origin(n, 3).unwrap();
    let mut pos = [0.0; 3];
    let mut sum = 0.0;
    for _ in 0..samples {
        for i in 1..n {
            pos.iter_mut()
                .for_each(|x| *x = rng.gen_range(-half_width..half_width));
            pairs.set_position(i, &pos);
        }
        sum += cluster.value(&pairs).unwrap();
    }
    let volume = (2.0 * half_width).powi(3);
    sum / samples as f64 * volume.powi(n as i32 - 1)
}

fn main() {
    tracing_subscriber::fmt::init();
    let mut rng = SmallRng::seed_from_u64(1234);

    let b3 = estimate_bn(3, 1.0, 1_000_000, &mut rng);
    println!("B3 = {:.4} (exact {:.4})", b3, 5.0 * PI * PI / 18.0);

    let b2 = 2.0 * PI / 3.0;
    let b4 = estimate_bn(4, 2.0, 1_000_000, &mut rng);
    println!("B4 = {:.4} (reference {:.4})", b4, 0.28695 * b2 * b2 * b2);
}
