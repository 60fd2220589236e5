//! The `bettermodel` command tree
//!
//! Nine subcommands over an in-memory model store, plus a nested
//! `bettermodel debug` module with its own entry executor.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{bail, Context};
use cmdmod_core::{
    command_module, double_parser, integer_parser, string_parser, CommandContext, CommandSource,
    Component, Dispatcher, HelpFraming, NamedColor,
};
use parking_lot::{Mutex, RwLock};
use tokio::{
    runtime::Handle,
    task::{JoinError, JoinSet},
};
use tracing::{info, warn};

use crate::config::{load_config, Config};

pub const MODULE_NAME: &str = "bettermodel";
pub const MODULE_ALIAS: &str = "bm";

/// A model placed in the world
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedModel {
    pub id: u32,
    pub model: String,
    pub scale: f64,
    pub hidden: bool,
}

/// Known models, spawned instances and player disguises
#[derive(Debug, Default)]
pub struct ModelStore {
    known: BTreeSet<String>,
    spawned: BTreeMap<u32, SpawnedModel>,
    disguises: BTreeMap<String, String>,
    next_id: u32,
}

impl ModelStore {
    pub fn new(models: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            known: models.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Swap in a new set of known models, returning how many there are
    pub fn replace_known(&mut self, models: impl IntoIterator<Item = impl Into<String>>) -> usize {
        self.known = models.into_iter().map(Into::into).collect();
        self.known.len()
    }

    pub fn is_known(&self, model: &str) -> bool {
        self.known.contains(model)
    }

    pub fn known(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(String::as_str)
    }

    pub fn spawned(&self) -> impl Iterator<Item = &SpawnedModel> {
        self.spawned.values()
    }

    pub fn disguises(&self) -> impl Iterator<Item = (&str, &str)> {
        self.disguises
            .iter()
            .map(|(player, model)| (player.as_str(), model.as_str()))
    }

    /// Spawn a known model and return its id
    ///
    /// # Errors
    ///
    /// Returns error if the model is unknown
    pub fn spawn(&mut self, model: &str, scale: f64) -> anyhow::Result<u32> {
        self.require_known(model)?;
        self.next_id += 1;
        let id = self.next_id;
        self.spawned.insert(
            id,
            SpawnedModel {
                id,
                model: model.to_string(),
                scale,
                hidden: false,
            },
        );
        Ok(id)
    }

    pub fn despawn(&mut self, id: u32) -> Option<SpawnedModel> {
        self.spawned.remove(&id)
    }

    /// # Errors
    ///
    /// Returns error if no model with `id` is spawned
    pub fn set_hidden(&mut self, id: u32, hidden: bool) -> anyhow::Result<()> {
        let spawned = self
            .spawned
            .get_mut(&id)
            .with_context(|| format!("No spawned model #{id}"))?;
        spawned.hidden = hidden;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns error if the model is unknown
    pub fn disguise(&mut self, player: &str, model: &str) -> anyhow::Result<()> {
        self.require_known(model)?;
        self.disguises.insert(player.to_string(), model.to_string());
        Ok(())
    }

    pub fn undisguise(&mut self, player: &str) -> Option<String> {
        self.disguises.remove(player)
    }

    pub fn disguise_of(&self, player: &str) -> Option<&str> {
        self.disguises.get(player).map(String::as_str)
    }

    fn require_known(&self, model: &str) -> anyhow::Result<()> {
        if !self.is_known(model) {
            bail!("Unknown model: {model}");
        }
        Ok(())
    }
}

/// State shared by every registered executor
pub struct ShellState {
    store: RwLock<ModelStore>,
    config_path: Option<PathBuf>,
    reloads: Mutex<JoinSet<()>>,
}

impl ShellState {
    pub fn new(config: &Config, config_path: Option<PathBuf>) -> Self {
        Self {
            store: RwLock::new(ModelStore::new(config.models.iter().cloned())),
            config_path,
            reloads: Mutex::new(JoinSet::new()),
        }
    }

    pub const fn store(&self) -> &RwLock<ModelStore> {
        &self.store
    }

    /// Re-read the config file in the background and replace the known models
    ///
    /// Sends the "Reloading" notice before spawning. Finished reloads are reaped here.
    ///
    /// # Errors
    ///
    /// Returns error if called outside a tokio runtime
    pub fn start_reload(self: &Arc<Self>, source: Arc<dyn CommandSource>) -> anyhow::Result<()> {
        let handle = Handle::try_current().context("Reload needs a running tokio runtime")?;
        source.info("Reloading models...");

        let state = Arc::clone(self);
        let mut reloads = self.reloads.lock();
        reap(&mut reloads);
        reloads.spawn_on(
            async move {
                match load_config(state.config_path.as_deref()).await {
                    Ok(config) => {
                        let count = state.store.write().replace_known(config.models);
                        info!(count, "reloaded models");
                        source.info(&reloaded_message(count));
                    }
                    Err(e) => {
                        warn!(error = %e, "model reload failed");
                        source.warn(&format!("Reload failed: {e:#}"));
                    }
                }
            },
            &handle,
        );
        Ok(())
    }

    /// Drop finished reloads and return how many are still running
    pub fn reap_finished_reloads(&self) -> usize {
        let mut reloads = self.reloads.lock();
        reap(&mut reloads);
        reloads.len()
    }

    /// Wait for every reload started so far
    pub async fn wait_for_reloads(&self) {
        let mut pending = std::mem::take(&mut *self.reloads.lock());
        while let Some(joined) = pending.join_next().await {
            log_join_failure(joined);
        }
    }
}

fn reap(reloads: &mut JoinSet<()>) {
    while let Some(joined) = reloads.try_join_next() {
        log_join_failure(joined);
    }
}

fn log_join_failure(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        warn!(error = %e, "reload task did not complete");
    }
}

fn reloaded_message(count: usize) -> String {
    if count == 1 {
        "Reloaded 1 model.".to_string()
    } else {
        format!("Reloaded {count} models.")
    }
}

fn caller_or(ctx: &CommandContext, argument: &str) -> String {
    ctx.optional::<String>(argument)
        .unwrap_or_else(|| ctx.source().name().to_string())
}

fn spawned_line(spawned: &SpawnedModel) -> Component {
    let line = Component::colored(format!("#{}", spawned.id), NamedColor::Gold)
        .append(Component::space())
        .append(Component::text(spawned.model.as_str()))
        .append(Component::colored(
            format!(" (scale {})", spawned.scale),
            NamedColor::Gray,
        ));
    if spawned.hidden {
        line.append(Component::colored(" [hidden]", NamedColor::DarkGray))
    } else {
        line
    }
}

/// Register `bettermodel` and `bettermodel debug`
pub fn register<D: Dispatcher + ?Sized>(
    dispatcher: &mut D,
    state: &Arc<ShellState>,
    framing: &HelpFraming,
) {
    let root = command_module(MODULE_NAME, |module| {
        module.with_aliases([MODULE_ALIAS]);
        module.with_short_description("Manage models");
        module.with_framing(framing.clone());

        module.command("reload", |cmd| {
            cmd.with_aliases(["re", "rl"]);
            cmd.with_short_description("Reload the model list");
            let state = Arc::clone(state);
            cmd.executes(move |ctx| state.start_reload(Arc::clone(ctx.source())));
        });

        module.command("spawn", |cmd| {
            cmd.with_aliases(["s"]);
            cmd.with_short_description("Spawn a model");
            cmd.with_required_argument("model", string_parser());
            cmd.with_optional_argument("scale", double_parser(0.0));
            let state = Arc::clone(state);
            cmd.executes(move |ctx| {
                let model = ctx.get::<String>("model")?;
                let scale = ctx.get_or_default("scale", 1.0);
                let id = state.store.write().spawn(&model, scale)?;
                ctx.source().info(&format!("Spawned {model} as #{id}."));
                Ok(())
            });
        });

        module.command("list", |cmd| {
            cmd.with_aliases(["ls"]);
            cmd.with_short_description("List spawned models");
            let state = Arc::clone(state);
            cmd.executes(move |ctx| {
                let lines: Vec<Component> =
                    state.store.read().spawned().map(spawned_line).collect();
                if lines.is_empty() {
                    ctx.source().info("No models spawned.");
                } else {
                    ctx.source().send(&lines);
                }
                Ok(())
            });
        });

        module.command("despawn", |cmd| {
            cmd.with_short_description("Remove a spawned model");
            cmd.with_required_argument("id", integer_parser(1, i64::from(u32::MAX)));
            let state = Arc::clone(state);
            cmd.executes(move |ctx| {
                let id = ctx.get::<u32>("id")?;
                let removed = state
                    .store
                    .write()
                    .despawn(id)
                    .with_context(|| format!("No spawned model #{id}"))?;
                ctx.source()
                    .info(&format!("Despawned {} #{id}.", removed.model));
                Ok(())
            });
        });

        module.command("disguise", |cmd| {
            cmd.with_short_description("Disguise a player as a model");
            cmd.with_required_argument("model", string_parser());
            cmd.with_optional_argument("player", string_parser());
            let state = Arc::clone(state);
            cmd.executes(move |ctx| {
                let model = ctx.get::<String>("model")?;
                let player = caller_or(ctx, "player");
                state.store.write().disguise(&player, &model)?;
                ctx.source()
                    .info(&format!("{player} is now disguised as {model}."));
                Ok(())
            });
        });

        module.command("undisguise", |cmd| {
            cmd.with_short_description("Remove a player's disguise");
            cmd.with_optional_argument("player", string_parser());
            let state = Arc::clone(state);
            cmd.executes(move |ctx| {
                let player = caller_or(ctx, "player");
                if state.store.write().undisguise(&player).is_none() {
                    bail!("{player} is not disguised");
                }
                ctx.source().info(&format!("{player} is no longer disguised."));
                Ok(())
            });
        });

        for (name, hidden) in [("hide", true), ("show", false)] {
            module.command(name, |cmd| {
                cmd.with_short_description(if hidden {
                    "Hide a spawned model"
                } else {
                    "Show a hidden model"
                });
                cmd.with_required_argument("id", integer_parser(1, i64::from(u32::MAX)));
                let state = Arc::clone(state);
                cmd.executes(move |ctx| {
                    let id = ctx.get::<u32>("id")?;
                    state.store.write().set_hidden(id, hidden)?;
                    let verb = if hidden { "hidden" } else { "visible" };
                    ctx.source().info(&format!("Model #{id} is now {verb}."));
                    Ok(())
                });
            });
        }

        module.command("version", |cmd| {
            cmd.with_short_description("Show the version");
            cmd.executes(|ctx| {
                ctx.source()
                    .info(&format!("cmdmod {}", env!("CARGO_PKG_VERSION")));
                Ok(())
            });
        });
    });

    let debug = root.command_module("debug", |module| {
        module.with_short_description("Inspect internal state");
        let summary = Arc::clone(state);
        module.executes(move |ctx| {
            let store = summary.store.read();
            ctx.source().info(&format!(
                "{} known models, {} spawned, {} disguised.",
                store.known().count(),
                store.spawned().count(),
                store.disguises().count()
            ));
            Ok(())
        });

        module.command("models", |cmd| {
            cmd.with_short_description("List known models");
            let state = Arc::clone(state);
            cmd.executes(move |ctx| {
                let lines: Vec<Component> = state
                    .store
                    .read()
                    .known()
                    .map(|model| Component::colored(model, NamedColor::Aqua))
                    .collect();
                ctx.source().send(&lines);
                Ok(())
            });
        });

        module.command("disguises", |cmd| {
            cmd.with_short_description("List active disguises");
            let state = Arc::clone(state);
            cmd.executes(move |ctx| {
                let lines: Vec<Component> = state
                    .store
                    .read()
                    .disguises()
                    .map(|(player, model)| Component::text(format!("{player} -> {model}")))
                    .collect();
                if lines.is_empty() {
                    ctx.source().info("No active disguises.");
                } else {
                    ctx.source().send(&lines);
                }
                Ok(())
            });
        });
    });

    root.build(dispatcher);
    debug.build(dispatcher);
}
