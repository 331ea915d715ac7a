//! Test harness over in-memory dependencies.
//!
//! Activities run against the same `ServerDeps` container as production,
//! with the store, mailer and permissions swapped for mocks the test can
//! inspect afterwards.

use std::sync::Arc;

use member_profiles::common::auth::Actor;
use member_profiles::common::MemberId;
use member_profiles::kernel::test_dependencies::{InMemoryProfileStore, RecordingMailer};
use member_profiles::kernel::{ServerDeps, TestDependencies};

pub struct TestHarness {
    pub deps: ServerDeps,
    pub store: Arc<InMemoryProfileStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::from_dependencies(TestDependencies::new())
    }

    pub fn from_dependencies(test_deps: TestDependencies) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let store = test_deps.store.clone();
        let mailer = test_deps.mailer.clone();
        Self {
            deps: test_deps.into_server_deps(),
            store,
            mailer,
        }
    }

    pub fn admin(&self) -> Actor {
        Actor::new(MemberId::new(), true)
    }

    pub fn member_actor(&self, member_id: MemberId) -> Actor {
        Actor::new(member_id, false)
    }
}
