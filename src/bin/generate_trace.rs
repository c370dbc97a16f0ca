//! Writes a synthetic instrument CSV (preamble + noisy cyclic load) so the
//! viewer can be demoed without a test rig.

use std::f64::consts::PI;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);

    let output_path = "sample_trace.csv";
    let mut writer = csv::Writer::from_path(output_path)?;

    // Rig metadata preamble, 25 lines like the real machine writes.
    for i in 0..25 {
        writer.write_record([format!("# rig metadata {i}"), String::new()])?;
    }

    // 12 load cycles of ~300 samples, peak force slowly fading as the strut
    // settles, force reported negative (compression) like the instrument.
    let cycles = 12;
    let samples_per_cycle = 300;
    let mut written = 0usize;
    for c in 0..cycles {
        let amplitude = 45.0 - 0.8 * c as f64;
        for s in 0..samples_per_cycle {
            let phase = s as f64 / samples_per_cycle as f64;
            let load = amplitude * (PI * phase).sin().max(0.0);
            let force = -(load + rng.gauss(0.0, 0.6));
            let angle = 12.0 * (2.0 * PI * phase).sin() + rng.gauss(0.0, 0.1);
            writer.write_record([format!("{force:.3}"), format!("{angle:.3}")])?;
            written += 1;
        }
    }
    writer.flush()?;

    println!("Wrote {written} samples ({cycles} load cycles) to {output_path}");
    Ok(())
}
