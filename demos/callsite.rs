use std::collections::HashMap;

use leakanalyzer::{CallSite, CallSiteTable, LeakAnalyzer};

/// A cache which is never evicted.
struct Cache {
    entries: HashMap<u64, (CallSite, String)>,
}

impl Cache {
    fn insert(&mut self, table: &mut CallSiteTable, key: u64) {
        let site = table.track();
        self.entries.insert(key, (site, format!("value-{key}")));
    }
}

fn handle_request(table: &mut CallSiteTable, id: u64) -> (CallSite, Vec<u8>) {
    (table.track(), vec![0; id as usize % 64])
}

fn spawn_worker(table: &mut CallSiteTable) -> CallSite {
    table.track()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut table = CallSiteTable::new(&["callsite"]);
    let mut analyzer = LeakAnalyzer::<CallSite>::new(8, 3)?;
    let mut cache = Cache {
        entries: HashMap::new(),
    };

    // a steady amount of long-lived instances
    let workers: Vec<CallSite> = (0..10).map(|_| spawn_worker(&mut table)).collect();

    for cycle in 0..6u64 {
        for key in 0..100 {
            cache.insert(&mut table, cycle * 100 + key);
        }

        let requests: Vec<_> = (0..50).map(|id| handle_request(&mut table, id)).collect();
        for (site, _) in &requests {
            table.release(site);
        }

        analyzer.sample(&mut table);
        println!("{}", analyzer.dump(2048));
    }

    println!(
        "cached {} entries with {} workers",
        cache.entries.len(),
        workers.len()
    );
    for suspect in analyzer.suspects() {
        println!("leaking: {suspect}");
    }

    Ok(())
}
