//! Scripted assessment engine.

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;

use crate::domain::{
    jobs::records::{Finding, Severity},
    orchestrator::engine::{AssessmentEngine, AssessmentRequest, EngineError},
};

#[derive(Debug, Clone)]
pub(crate) enum Script {
    Findings(Vec<Finding>),
    Fail(EngineError),
    Panic,
    Hang,
}

/// Engine whose delay and outcome are fixed up front.
#[derive(Debug)]
pub(crate) struct ScriptedEngine {
    delay: Duration,
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedEngine {
    pub(crate) fn new(delay: Duration, script: Script) -> Self {
        Self {
            delay,
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub(crate) fn finding(severity: Severity, url: &str) -> Finding {
    Finding {
        kind: "SQL Injection".to_string(),
        severity,
        payload: "' OR '1'='1".to_string(),
        description: "injectable parameter".to_string(),
        recommendation: "use prepared statements".to_string(),
        url: url.to_string(),
    }
}

#[async_trait]
impl AssessmentEngine for ScriptedEngine {
    async fn run(&self, _request: AssessmentRequest) -> Result<Vec<Finding>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        match &self.script {
            Script::Findings(findings) => Ok(findings.clone()),
            Script::Fail(error) => Err(error.clone()),
            Script::Panic => panic!("scripted engine panic"),
            Script::Hang => std::future::pending().await,
        }
    }
}
