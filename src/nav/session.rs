//! Walk sessions: the public entry points.
//!
//! A [`PrimarySession`] walks a tree from its root. A [`ResumeSession`]
//! loads a state file written by [`PrimarySession::save`] and continues the
//! walk with the chosen [`ResumeStrategy`]. Both validate every option when
//! they are constructed; once built, a session cannot fail for
//! configuration reasons.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ConfigError;
use crate::nav::accelerate::Accelerator;
use crate::nav::filter::{new_compound_filter, new_node_filter, CompoundFilter, NodeFilter};
use crate::nav::agent::Agent;
use crate::nav::frame::{Invoker, NavigationFrame};
use crate::nav::listen::{Listener, ListeningState};
use crate::nav::metrics::{Metrics, TraverseResult};
use crate::nav::navigator::{new_navigator, Navigator};
use crate::nav::notify::Notifier;
use crate::nav::options::{OptionsStore, Subscription, TraverseOptions};
use crate::nav::persist::{restore, ActiveState, Restorer, StateMarshaller};
use crate::nav::resume::{self, ResumeStrategy};
use crate::nav::sampling::{SampleType, Sampler};
use crate::text::NavContext;

/// Everything a built session owns.
struct Engine {
    navigator: Box<dyn Navigator>,
    frame: NavigationFrame,
    store: OptionsStore,
    marshaller: StateMarshaller,
}

impl Engine {
    fn build(ctx: &NavContext, root: &Path, options: TraverseOptions) -> Result<Self, ConfigError> {
        let TraverseOptions {
            store,
            callback,
            hooks,
            notify,
            listen,
            custom_filters,
            iteration,
            cancel,
            output,
        } = options;

        let callback = callback.ok_or(ConfigError::MissingCallback)?;
        let marshaller = StateMarshaller::new(&store.persist.format)?;
        if store.acceleration.enabled {
            store.acceleration.validate()?;
        }

        let defs = store.filter_defs.as_ref();
        let node_filter: Option<Arc<dyn NodeFilter>> =
            match (custom_filters.node, defs.and_then(|d| d.node.as_ref())) {
                (Some(filter), _) => Some(filter),
                (None, Some(def)) => Some(Arc::from(new_node_filter(def)?)),
                (None, None) => None,
            };
        let children_filter: Option<Arc<dyn CompoundFilter>> =
            match (custom_filters.children, defs.and_then(|d| d.children.as_ref())) {
                (Some(filter), _) => Some(filter),
                (None, Some(def)) => Some(Arc::from(new_compound_filter(def)?)),
                (None, None) => None,
            };
        if children_filter.is_some() && store.subscription == Subscription::Folders {
            log::warn!("children filter ignored: the folders subscription never visits files");
        }

        let listener = Listener::build(&listen, &store.listen_defs, store.behaviours.listen)?;
        let sampler = store
            .sampling
            .map(|opts| Sampler::new(opts, node_filter.clone(), iteration.as_ref()))
            .transpose()?;

        let previews = store
            .sampling
            .is_some_and(|s| s.sample_type != SampleType::Slice);
        let do_extend = store.behaviours.do_extend
            || node_filter.is_some()
            || listener.is_some()
            || previews
            || hooks.custom_extension.is_some();

        let agent = Agent::new(
            hooks,
            store.behaviours.sort,
            Arc::clone(&ctx.text),
            store.subscription,
            do_extend,
        )
        .with_children_filter(children_filter)
        .with_sampler(sampler);
        let navigator = new_navigator(agent);

        let mut frame = NavigationFrame::new(
            root.to_path_buf(),
            callback,
            Notifier::new(notify),
            cancel.clone(),
        );
        if let Some(filter) = node_filter {
            frame.decorate_filter(filter);
        }
        if let Some(listener) = listener {
            frame.decorate_listener(listener);
        }
        if store.acceleration.enabled {
            let accelerator = Accelerator::start(&store.acceleration, cancel, output)?;
            frame.set_invoker(Invoker::Accelerated(accelerator));
        }

        log::debug!(
            "session for {}: subscription {}, decorations {:?}, extend {}, accelerated {}",
            root.display(),
            store.subscription,
            frame.decoration_labels(),
            do_extend,
            store.acceleration.enabled
        );

        Ok(Self {
            navigator,
            frame,
            store,
            marshaller,
        })
    }

    fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.marshaller
            .marshal(path, &self.store, &self.frame.snapshot())
    }
}

/// A walk from the root of a tree.
///
/// # Example
///
/// ```rust,no_run
/// use rustwalk::nav::{PrimarySession, TraverseOptions};
/// use rustwalk::text::NavContext;
///
/// let options = TraverseOptions::with_callback(|item| {
///     println!("{}", item.path.display());
///     Ok(())
/// });
/// let mut session = PrimarySession::new(&NavContext::default(), "/music", options)?;
/// let result = session.run();
/// println!("{} files", result.metrics.files());
/// # Ok::<(), rustwalk::error::ConfigError>(())
/// ```
pub struct PrimarySession {
    root: PathBuf,
    engine: Engine,
}

impl PrimarySession {
    /// Validate `options` and build a session walking `root`.
    pub fn new(
        ctx: &NavContext,
        root: impl AsRef<Path>,
        options: TraverseOptions,
    ) -> Result<Self, ConfigError> {
        let root = root.as_ref().to_path_buf();
        let engine = Engine::build(ctx, &root, options)?;
        Ok(Self { root, engine })
    }

    /// Walk the tree. A session is meant to run once; the accelerator, if
    /// any, is stopped when the walk ends.
    pub fn run(&mut self) -> TraverseResult {
        let result = self
            .engine
            .navigator
            .top(&mut self.engine.frame, &self.root);
        self.engine.frame.finish();
        result
    }

    /// Persist the options and the walk position to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.engine.save(path)
    }

    /// Current walk position.
    #[must_use]
    pub fn state(&self) -> ActiveState {
        self.engine.frame.snapshot()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl std::fmt::Debug for PrimarySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimarySession")
            .field("root", &self.root)
            .field("frame", &self.engine.frame)
            .finish_non_exhaustive()
    }
}

/// Where to resume from and how.
pub struct ResumeInfo {
    /// State file written by a previous session
    pub path: PathBuf,
    /// Resume strategy
    pub strategy: ResumeStrategy,
    /// Re-attaches the callback and other live options (required)
    pub restorer: Option<Restorer>,
}

impl std::fmt::Debug for ResumeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResumeInfo")
            .field("path", &self.path)
            .field("strategy", &self.strategy)
            .field("restorer", &self.restorer.as_ref().map(|_| "<restorer>"))
            .finish()
    }
}

/// A walk continued from a saved state.
pub struct ResumeSession {
    active: ActiveState,
    strategy: ResumeStrategy,
    engine: Engine,
}

impl ResumeSession {
    /// Load the state at `info.path`, restore the live options and build
    /// the session. Fails before any walking if the state cannot be used.
    pub fn new(ctx: &NavContext, info: ResumeInfo) -> Result<Self, ConfigError> {
        let ResumeInfo {
            path,
            strategy,
            restorer,
        } = info;

        let marshaller = StateMarshaller::for_path(&path)?;
        let state = marshaller.unmarshal(&path)?;
        let (options, active) = restore(state, restorer)?;
        if !active.node_path.starts_with(&active.root) {
            return Err(ConfigError::Restore(format!(
                "node {} is not below root {}",
                active.node_path.display(),
                active.root.display()
            )));
        }

        let mut engine = Engine::build(ctx, &active.root, options)?;
        engine.frame.metrics = active.metrics.clone();
        log::debug!(
            "resuming {} at {} with {strategy} (listening {:?})",
            active.root.display(),
            active.node_path.display(),
            active.listen
        );

        Ok(Self {
            active,
            strategy,
            engine,
        })
    }

    /// Continue the walk. The result's metrics include those persisted by
    /// the earlier session.
    pub fn run(&mut self) -> TraverseResult {
        let Engine {
            navigator, frame, ..
        } = &mut self.engine;
        let resumed = match self.strategy {
            ResumeStrategy::Fastward => resume::fastward(navigator.as_ref(), frame, &self.active),
            ResumeStrategy::Spawn => resume::spawn(navigator.as_ref(), frame, &self.active),
        };
        if frame.listening_state() == Some(ListeningState::Fastward) {
            log::warn!(
                "resume point {} was never reached; nothing was delivered",
                self.active.node_path.display()
            );
        }
        frame.finish();

        let mut metrics: Metrics = self.active.metrics.clone();
        metrics.merge(&resumed.metrics);
        TraverseResult {
            error: resumed.error,
            metrics,
        }
    }

    /// Persist the options and the walk position to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.engine.save(path)
    }

    /// Current walk position, metrics included.
    #[must_use]
    pub fn state(&self) -> ActiveState {
        self.engine.frame.snapshot()
    }

    /// The state this session resumed from.
    #[must_use]
    pub fn resumed_from(&self) -> &ActiveState {
        &self.active
    }

    #[must_use]
    pub fn strategy(&self) -> ResumeStrategy {
        self.strategy
    }
}

impl std::fmt::Debug for ResumeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResumeSession")
            .field("active", &self.active)
            .field("strategy", &self.strategy)
            .field("frame", &self.engine.frame)
            .finish_non_exhaustive()
    }
}
