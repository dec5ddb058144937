use super::{
    EmitFuture,
    UnitCollector,
};
use crate::{
    elasticsearch::ElasticsearchApi,
    metrics::{
        Descriptor,
        MetricSink,
    },
};
use eyre::WrapErr;
use std::{
    collections::BTreeMap,
    sync::Arc,
};

/// Parses the cat API time format (`350.2micros`, `12ms`, `1.5s`, `2m`) into seconds.
pub fn parse_running_time(running_time: &str) -> Option<f64> {
    let running_time = running_time.trim();
    let split = running_time.find(|c: char| c.is_ascii_alphabetic())?;
    let (number, unit) = running_time.split_at(split);

    let number: f64 = number.parse().ok()?;
    if !number.is_finite() || number < 0.0 {
        return None;
    }

    let seconds = match unit {
        "nanos" => number / 1e9,
        "micros" => number / 1e6,
        "ms" => number / 1e3,
        "s" => number,
        "m" => number * 60.0,
        "h" => number * 3600.0,
        "d" => number * 86400.0,
        _ => return None,
    };

    Some(seconds)
}

/// Running time of the longest task per action and node.
pub struct TaskUnit {
    api: Arc<dyn ElasticsearchApi>,
    duration: Arc<Descriptor>,
}

impl TaskUnit {
    pub fn new(api: Arc<dyn ElasticsearchApi>) -> Self {
        Self {
            api,
            duration: Arc::new(Descriptor::gauge(
                "",
                "task_group_duration_seconds",
                "Task group running duration in seconds",
                &["action", "node", "cluster"],
            )),
        }
    }
}

impl UnitCollector for TaskUnit {
    fn name(&self) -> &'static str {
        "tasks"
    }

    fn describe(&self) -> Vec<Arc<Descriptor>> {
        vec![Arc::clone(&self.duration)]
    }

    fn emit<'a>(&'a self, cluster: &'a str, sink: &'a MetricSink) -> EmitFuture<'a> {
        Box::pin(async move {
            let tasks = self.api.tasks().await.wrap_err("failed to fetch tasks")?;

            let mut longest: BTreeMap<(&str, &str), f64> = BTreeMap::new();
            for task in &tasks {
                let Some(seconds) = parse_running_time(&task.running_time) else {
                    warn!(task = %task.task_id, running_time = %task.running_time, "cannot parse task running time");
                    continue;
                };

                longest
                    .entry((task.action.as_str(), task.node.as_str()))
                    .and_modify(|max| *max = max.max(seconds))
                    .or_insert(seconds);
            }

            for ((action, node), seconds) in longest {
                sink.emit(&self.duration, seconds, &[action, node, cluster])?;
            }

            Ok(())
        })
    }
}
