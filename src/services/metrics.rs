use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec};

lazy_static! {
    pub static ref MUTATIONS_COUNTER: CounterVec = register_counter_vec!(
        "taskflow_mutations_total",
        "Successful writes by entity and operation",
        &["entity", "op"]
    )
    .unwrap();
}

pub fn record(entity: &str, op: &str) {
    MUTATIONS_COUNTER.with_label_values(&[entity, op]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_increments_labelled_counter() {
        let before = MUTATIONS_COUNTER.with_label_values(&["task", "toggle"]).get();
        record("task", "toggle");
        let after = MUTATIONS_COUNTER.with_label_values(&["task", "toggle"]).get();
        assert!(after >= before + 1.0);
    }
}
