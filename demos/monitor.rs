use std::time::Duration;

use leakanalyzer::{LeakAnalyzer, SizeClass, SizeClassAllocator};
use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer as _;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt as _;

#[global_allocator]
static ALLOCATOR: SizeClassAllocator = SizeClassAllocator::init();

const RANKING_SIZE: usize = 8;
const SCORE_THRESHOLD: u32 = 3;
const CYCLES: usize = 8;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_log()?;

    let mut analyzer = LeakAnalyzer::<SizeClass>::new(RANKING_SIZE, SCORE_THRESHOLD)?;
    let mut source = &ALLOCATOR;
    let mut interval = tokio::time::interval(Duration::from_millis(200));
    // never released
    let mut leaked: Vec<Box<[u8; 200]>> = Vec::new();
    let mut burst: Vec<Box<[u8; 40]>> = Vec::new();

    for cycle in 0..CYCLES {
        interval.tick().await;

        leaked.extend((0..500).map(|_| Box::new([0u8; 200])));
        // a transient burst, which only lives for one cycle
        if cycle == 4 {
            burst.extend((0..300).map(|_| Box::new([0u8; 40])));
        } else {
            burst.clear();
        }

        analyzer.sample(&mut source);

        tracing::info!(
            "cycle {cycle}: {} bytes allocated\n{}",
            ALLOCATOR.allocated(),
            analyzer.dump(1024)
        );
    }

    tracing::info!(
        "leaked {} blocks; suspects: {:?}",
        leaked.len(),
        analyzer.suspects()
    );

    Ok(())
}

fn init_log() -> Result<(), Box<dyn std::error::Error>> {
    let stdout_logger = tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_line_number(true)
        .with_writer(std::io::stdout);

    let registry = tracing_subscriber::registry()
        .with(stdout_logger.with_filter(LevelFilter::from(Level::DEBUG)));

    tracing::subscriber::set_global_default(registry)?;

    Ok(())
}
