// cargo r --release --example revfilter_check
//
// Cross-checks the fast engine against the reference one on synthetic images,
// then times both. Sizes come from DEPNG_BENCH_WIDTH / DEPNG_BENCH_HEIGHT /
// DEPNG_BENCH_ROUNDS (a .env file works too); DEPNG_SKIP_BENCH skips timing.
use std::time::{Duration, Instant};
use log::{error, info, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};
use depng::filter::{BytesPerPixel, Defilter, FilterType, Strategy};

#[derive(Debug, Clone, Copy)]
enum Mode {
    Fixed(FilterType),
    /// Cycles through all filters row by row.
    Mixed,
}

const MODES: [Mode; 6] = [
    Mode::Fixed(FilterType::None),
    Mode::Fixed(FilterType::Sub),
    Mode::Fixed(FilterType::Up),
    Mode::Fixed(FilterType::Avg),
    Mode::Fixed(FilterType::Paeth),
    Mode::Mixed,
];

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Fixed(f) => f.name(),
        Mode::Mixed => "Mixed",
    }
}

/// Random coded bytes with tags set by `mode`. Unless `filter_first_row` is set,
/// row 0 is always None.
fn random_image(width: usize, height: usize, bpp: usize, mode: Mode, filter_first_row: bool, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let bpl = width * bpp + 1;
    let mut buf = vec![0u8; bpl * height];

    for (j, row) in buf.chunks_exact_mut(bpl).enumerate() {
        let filter = match mode {
            _ if j == 0 && !filter_first_row => FilterType::None,
            Mode::Fixed(f) => f,
            Mode::Mixed => FilterType::ALL[j % 5],
        };
        row[0] = filter.tag();
        rng.fill(&mut row[1..]);
    }
    buf
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn check() -> bool {
    let reference = Defilter::with_strategy(Strategy::Reference);
    let fast = Defilter::with_strategy(Strategy::Fast);
    let mut seed = 0;
    let mut ok = true;

    for mode in MODES.iter().cloned() {
        for filter_first_row in [false, true].iter().cloned() {
            for height in 1..20 {
                for width in 1..100 {
                    for bpp in BytesPerPixel::ALL.iter() {
                        let n = bpp.into_usize();
                        let bpl = width * n + 1;

                        let mut a = random_image(width, height, n, mode, filter_first_row, seed);
                        let mut b = a.clone();
                        seed += 1;

                        if let Err(e) = reference.run(&mut a, height, n, bpl).and(fast.run(&mut b, height, n, bpl)) {
                            error!("{}x{} bpp={} {}: {}", width, height, n, mode_name(mode), e);
                            return false;
                        }

                        if let Some(pos) = a.iter().zip(&b).position(|(x, y)| x != y) {
                            let (y, x) = (pos / bpl, pos % bpl);
                            error!(
                                "[{}x{}|bpp:{}|bpl={} at Y={} X={}] {} != {} ({})",
                                width, height, n, bpl, y, x, a[pos], b[pos], mode_name(mode)
                            );
                            ok = false;
                        }
                    }
                }
            }
            trace!("checked {} first_row={}", mode_name(mode), filter_first_row);
        }
    }
    ok
}

fn bench(strategy: Strategy, width: usize, height: usize, rounds: usize) {
    let defilter = Defilter::with_strategy(strategy);
    let mut total = Duration::default();

    for mode in MODES.iter().skip(1).cloned() {
        let mut mode_total = Duration::default();
        for bpp in BytesPerPixel::ALL.iter() {
            let n = bpp.into_usize();
            let bpl = width * n + 1;
            let mut buf = random_image(width, height, n, mode, true, 0);

            let start = Instant::now();
            for _ in 0..rounds {
                // defiltering the same buffer again costs the same; the work
                // depends on the tags, not the byte values
                if let Err(e) = defilter.run(&mut buf, height, n, bpl) {
                    error!("{}", e);
                    return;
                }
            }
            let elapsed = start.elapsed();
            mode_total += elapsed;
            info!("[BENCH] {:?} [{:>8.3} ms] [{}:{}]", strategy, elapsed.as_secs_f64() * 1e3, mode_name(mode), n);
        }
        total += mode_total;
        info!("[BENCH] {:?} [{:>8.3} ms] [{}:ALL]", strategy, mode_total.as_secs_f64() * 1e3, mode_name(mode));
    }
    info!("[BENCH] {:?} [{:>8.3} ms] [Total]", strategy, total.as_secs_f64() * 1e3);
}

pub fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if !check() {
        std::process::exit(1);
    }
    info!("[CHECK] reference and fast engines agree");

    if std::env::var_os("DEPNG_SKIP_BENCH").is_some() {
        return;
    }
    let width = env_usize("DEPNG_BENCH_WIDTH", 256);
    let height = env_usize("DEPNG_BENCH_HEIGHT", 256);
    let rounds = env_usize("DEPNG_BENCH_ROUNDS", 200);

    bench(Strategy::Reference, width, height, rounds);
    bench(Strategy::Fast, width, height, rounds);
}
