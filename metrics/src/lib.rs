pub mod server;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    // Chain
    best_block_number: IntGauge,
    block_processing_time: HistogramVec,
    reorgs: IntCounterVec,
    reorg_depth: HistogramVec,
    // Pending pool
    pending_blocks: IntGauge,
    blocks_processed: IntCounterVec,
    evicted_blocks: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        // Chain
        let best_block_number = IntGauge::with_opts(Opts::new(
            "chain_sync_best_block_number",
            "Number of the current best block",
        ))?;
        registry.register(Box::new(best_block_number.clone()))?;

        let block_processing_time = HistogramVec::new(
            HistogramOpts::new(
                "chain_sync_block_processing_time_seconds",
                "Time taken to process a delivered block, cascade included",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 1.0]),
            &[],
        )?;
        registry.register(Box::new(block_processing_time.clone()))?;

        let reorgs = IntCounterVec::new(
            Opts::new("chain_sync_reorgs_total", "Total number of best chain reorgs"),
            &[],
        )?;
        registry.register(Box::new(reorgs.clone()))?;

        let reorg_depth = HistogramVec::new(
            HistogramOpts::new(
                "chain_sync_reorg_depth",
                "Depth of best chain reorgs (in blocks)",
            )
            .buckets(vec![1.0, 2.0, 3.0, 5.0, 7.0, 10.0, 20.0, 30.0, 50.0, 100.0]),
            &[],
        )?;
        registry.register(Box::new(reorg_depth.clone()))?;

        // Pending pool
        let pending_blocks = IntGauge::with_opts(Opts::new(
            "chain_sync_pending_blocks",
            "Number of blocks waiting for a parent",
        ))?;
        registry.register(Box::new(pending_blocks.clone()))?;

        let blocks_processed = IntCounterVec::new(
            Opts::new(
                "chain_sync_blocks_processed_total",
                "Total number of delivered blocks by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(blocks_processed.clone()))?;

        let evicted_blocks = IntCounterVec::new(
            Opts::new(
                "chain_sync_evicted_blocks_total",
                "Total number of pending blocks evicted",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(evicted_blocks.clone()))?;

        Ok(Self {
            registry,
            best_block_number,
            block_processing_time,
            reorgs,
            reorg_depth,
            pending_blocks,
            blocks_processed,
            evicted_blocks,
        })
    }

    pub fn gather(&self) -> prometheus::Result<String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::<u8>::new();
        let encoder = TextEncoder::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }

    // Chain
    pub fn set_best_block_number(&self, v: i64) {
        self.best_block_number.set(v);
    }

    pub fn observe_block_processing_time(&self, duration: f64) {
        self.block_processing_time
            .with_label_values::<&str>(&[])
            .observe(duration);
    }

    pub fn inc_reorgs(&self) {
        self.reorgs.with_label_values::<&str>(&[]).inc();
    }

    pub fn observe_reorg_depth(&self, depth: f64) {
        self.reorg_depth.with_label_values::<&str>(&[]).observe(depth);
    }

    // Pending pool
    pub fn set_pending_blocks(&self, v: i64) {
        self.pending_blocks.set(v);
    }

    pub fn inc_blocks_processed(&self, outcome: &str) {
        self.blocks_processed.with_label_values(&[outcome]).inc();
    }

    pub fn inc_evicted_blocks(&self, reason: &str, count: u64) {
        self.evicted_blocks
            .with_label_values(&[reason])
            .inc_by(count);
    }
}

pub type SharedMetrics = Arc<Metrics>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_exposes_sync_metrics() {
        let metrics = Metrics::new().unwrap();
        metrics.set_best_block_number(70);
        metrics.inc_blocks_processed("connected");
        metrics.inc_evicted_blocks("age", 3);
        metrics.inc_reorgs();
        metrics.observe_reorg_depth(3.0);

        let text = metrics.gather().unwrap();
        assert!(text.contains("chain_sync_best_block_number 70"));
        assert!(text.contains("chain_sync_blocks_processed_total{outcome=\"connected\"} 1"));
        assert!(text.contains("chain_sync_evicted_blocks_total{reason=\"age\"} 3"));
        assert!(text.contains("chain_sync_reorgs_total 1"));
    }

    #[test]
    fn test_separate_instances_do_not_share_registry() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();
        first.set_pending_blocks(5);

        assert!(second.gather().unwrap().contains("chain_sync_pending_blocks 0"));
    }
}
