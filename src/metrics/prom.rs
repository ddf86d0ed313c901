use lazy_static::lazy_static;
use prometheus::{labels, register_gauge, Gauge};

use tlsgrade::Report;

lazy_static! {
    static ref TLSGRADE_DAYS_REMAINING: Gauge =
        register_gauge!("tlsgrade_days_remaining", "days before the leaf certificate expires")
            .unwrap();
    static ref TLSGRADE_CHECKS_FAILED: Gauge =
        register_gauge!("tlsgrade_checks_failed", "number of failed validations").unwrap();
    static ref TLSGRADE_CHECKS_WARNING: Gauge =
        register_gauge!("tlsgrade_checks_warning", "number of validations with a warning")
            .unwrap();
}

/// Function to push metrics to prometheus
/// # Arguments
/// * `reports` - Reports of the hosts that could be inspected
/// * `prometheus_address` - Push gateway address
pub fn prometheus_metrics(reports: &[Report], prometheus_address: &str) {
    for report in reports {
        TLSGRADE_DAYS_REMAINING.set(report.certificate.days_remaining as f64);
        TLSGRADE_CHECKS_FAILED.set(report.summary.failed as f64);
        TLSGRADE_CHECKS_WARNING.set(report.summary.warnings as f64);

        let metric_families = prometheus::gather();
        let prometheus_client = prometheus::push_metrics(
            "tlsgrade",
            labels! {
                "instance".to_owned() => "tlsgrade".to_owned(),
                "job".to_owned() => "tlsgrade".to_owned(),
                "host".to_owned() => report.hostname.to_owned(),
                "grade".to_owned() => report.grade.to_string(),
                "protocol".to_owned() => report.connection.protocol.to_owned(),
                "cipher".to_owned() => report.connection.cipher.to_owned(),
                "authorized".to_owned() => report.connection.authorized.to_string(),
            },
            &format!("{}/metrics/job", prometheus_address),
            metric_families,
            None,
        );

        match prometheus_client {
            Ok(_) => log::debug!("pushed metrics for {}", report.hostname),
            Err(e) => log::warn!("Failed to push metrics to prometheus: {}", e),
        }
    }
}
