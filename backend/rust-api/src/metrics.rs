use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    // Business Metrics
    pub static ref ATTEMPTS_STARTED_TOTAL: IntCounter = register_int_counter!(
        "attempts_started_total",
        "Total number of exam attempts started"
    )
    .unwrap();

    pub static ref ATTEMPTS_COMPLETED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "attempts_completed_total",
        "Total number of exam attempts completed",
        &["eligibility"]
    )
    .unwrap();

    pub static ref ANSWERS_SUBMITTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "answers_submitted_total",
        "Total number of answers submitted",
        &["correct"]
    )
    .unwrap();

    pub static ref TIERS_UNLOCKED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "tiers_unlocked_total",
        "Total number of tier unlocks granted by the gate policy",
        &["tier"]
    )
    .unwrap();

    pub static ref EXAMS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "exams_created_total",
        "Total number of exams created"
    )
    .unwrap();

    pub static ref QUESTIONS_REJECTED_TOTAL: IntCounter = register_int_counter!(
        "questions_rejected_total",
        "Generated question records rejected at the boundary"
    )
    .unwrap();
}

pub fn record_answer_submitted(correct: bool) {
    let label = if correct { "true" } else { "false" };
    ANSWERS_SUBMITTED_TOTAL.with_label_values(&[label]).inc();
}

/// Renders the full registry in Prometheus text format for `/metrics`.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
