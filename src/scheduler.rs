use crate::cache::ListingCache;
use crate::error::ProberError;
use crate::lister::RemoteLister;
use crate::prober;
use crate::types::{AvailabilityRecord, ProbeRequest};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::sync::Arc;

pub struct Scheduler {
    lister: Arc<dyn RemoteLister>,
}

impl Scheduler {
    pub fn new(lister: Arc<dyn RemoteLister>) -> Self {
        Self { lister }
    }

    /// Probes every date of the request under the configured concurrency
    /// limit. Workers share one listing cache, created here and discarded
    /// with the run. Completion order is unspecified; the returned records
    /// are sorted by (year, day of year).
    pub async fn run(&self, request: &ProbeRequest) -> Result<Vec<AvailabilityRecord>, ProberError> {
        let units = request.date_units();
        info!(
            "Probing {} days for station {} with parallelism {}",
            units.len(),
            request.station,
            request.parallelism
        );

        let cache = Arc::new(ListingCache::new(self.lister.clone()));
        let pb = self.create_progress_bar(units.len() as u64);

        let results: Vec<Result<AvailabilityRecord, ProberError>> = stream::iter(units)
            .map(|unit| {
                let cache = Arc::clone(&cache);
                let pb = pb.clone();
                async move {
                    let record = prober::probe(unit, request, &cache).await;
                    pb.inc(1);
                    record
                }
            })
            .buffer_unordered(request.parallelism)
            .collect()
            .await;
        pb.finish_and_clear();

        let mut records = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        records.sort_by_key(|record| (record.year, record.doy));
        info!("Collected {} availability records", records.len());
        Ok(records)
    }

    fn create_progress_bar(&self, total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb
    }
}
