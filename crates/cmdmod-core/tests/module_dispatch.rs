//! End-to-end tests: modules built into the in-memory registry

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use cmdmod_core::{
    command_module, double_parser, string_parser, BufferedSource, CommandModule, CommandRegistry,
    Component, Error, Result,
};

const SUBCOMMANDS: [&str; 9] = [
    "reload",
    "spawn",
    "test",
    "disguise",
    "undisguise",
    "play",
    "hide",
    "show",
    "version",
];

fn bettermodel() -> CommandModule {
    command_module("bettermodel", |module| {
        module.with_aliases(["bm"]);
        for name in SUBCOMMANDS {
            module.command(name, |cmd| {
                cmd.with_short_description(format!("{name} things"));
                cmd.executes(move |ctx| {
                    ctx.source().info(&format!("ran {name}"));
                    Ok(())
                });
            });
        }
    })
}

fn texts(lines: &[Component]) -> Vec<String> {
    lines.iter().map(Component::plain_text).collect()
}

#[test]
fn test_nine_subcommands_make_two_pages() {
    let module = bettermodel();
    assert_eq!(module.max_page(), 2);

    let first = texts(module.help_page(1));
    let second = texts(module.help_page(2));
    for (index, name) in SUBCOMMANDS.iter().enumerate() {
        let entry = format!("/bettermodel {name} - {name} things");
        if index < 6 {
            assert!(first.contains(&entry), "page 1 missing {entry}");
            assert!(!second.contains(&entry));
        } else {
            assert!(second.contains(&entry), "page 2 missing {entry}");
            assert!(!first.contains(&entry));
        }
    }
    assert_eq!(
        second.last().map(String::as_str),
        Some("---------< Page 2 / 2 >---------")
    );
}

#[test]
fn test_help_literal_and_alias_render_pages() -> Result<()> {
    let mut registry = CommandRegistry::new();
    bettermodel().build(&mut registry);
    let source = Arc::new(BufferedSource::new("tester"));

    registry.execute(source.clone(), "/bm help")?;
    assert!(source
        .plain_lines()
        .contains(&"---------< Page 1 / 2 >---------".to_string()));

    source.clear();
    registry.execute(source.clone(), "bettermodel h 2")?;
    assert!(source
        .plain_lines()
        .contains(&"---------< Page 2 / 2 >---------".to_string()));

    let out_of_range = registry.execute(source, "bm help 3");
    assert!(matches!(out_of_range, Err(Error::InvalidArgument { name, .. }) if name == "page"));
    Ok(())
}

#[test]
fn test_subcommand_dispatch_by_name_and_alias() -> Result<()> {
    let mut registry = CommandRegistry::new();
    let module = command_module("bettermodel", |module| {
        module.with_aliases(["bm"]);
        module.command("reload", |cmd| {
            cmd.with_aliases(["re", "rl"]);
            cmd.executes(|ctx| {
                ctx.source().info("reloaded");
                Ok(())
            });
        });
    });
    module.build(&mut registry);
    let source = Arc::new(BufferedSource::new("tester"));

    registry.execute(source.clone(), "bm rl")?;
    registry.execute(source.clone(), "bettermodel reload")?;

    assert_eq!(source.plain_lines(), ["reloaded", "reloaded"]);
    Ok(())
}

#[test]
fn test_explicit_page_routes_to_help_not_executor() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let module = command_module("bettermodel", move |module| {
        module.with_aliases(["bm"]);
        module.command("reload", |_| {});
        module.executes(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    });
    let mut registry = CommandRegistry::new();
    module.build(&mut registry);
    let source = Arc::new(BufferedSource::new("tester"));

    registry.execute(source.clone(), "bm 1")?;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!source.plain_lines().is_empty());

    source.clear();
    registry.execute(source.clone(), "bm")?;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(source.plain_lines().is_empty());
    Ok(())
}

#[test]
fn test_without_executor_bare_invocation_shows_first_page() -> Result<()> {
    let mut registry = CommandRegistry::new();
    bettermodel().build(&mut registry);
    let source = Arc::new(BufferedSource::new("tester"));

    registry.execute(source.clone(), "bm")?;

    assert!(source
        .plain_lines()
        .contains(&"---------< Page 1 / 2 >---------".to_string()));
    Ok(())
}

#[test]
fn test_required_then_optional_accepts_required_alone() -> Result<()> {
    let module = command_module("bettermodel", |module| {
        module.command("spawn", |cmd| {
            cmd.with_required_argument("model", string_parser());
            cmd.with_optional_argument("scale", double_parser(0.0));
            cmd.executes(|ctx| {
                let model = ctx.get::<String>("model")?;
                let scale = ctx.get_or_default("scale", 1.0);
                ctx.source().info(&format!("{model} at {scale}"));
                Ok(())
            });
        });
    });
    let mut registry = CommandRegistry::new();
    module.build(&mut registry);
    let source = Arc::new(BufferedSource::new("tester"));

    registry.execute(source.clone(), "bettermodel spawn steve")?;
    registry.execute(source.clone(), "bettermodel spawn steve 2.5")?;

    assert_eq!(source.plain_lines(), ["steve at 1", "steve at 2.5"]);
    Ok(())
}

#[test]
fn test_overwritten_subcommand_is_registered_once() -> Result<()> {
    let module = command_module("bm", |module| {
        module.command("spawn", |cmd| {
            cmd.with_short_description("first");
            cmd.executes(|ctx| {
                ctx.source().info("first");
                Ok(())
            });
        });
        module.command("spawn", |cmd| {
            cmd.with_short_description("second");
            cmd.executes(|ctx| {
                ctx.source().info("second");
                Ok(())
            });
        });
    });
    let help = texts(module.help_page(1));
    assert!(help.contains(&"/bm spawn - second".to_string()));
    assert!(!help.contains(&"/bm spawn - first".to_string()));

    let mut registry = CommandRegistry::new();
    module.build(&mut registry);
    assert_eq!(registry.len(), 3);

    let source = Arc::new(BufferedSource::new("tester"));
    registry.execute(source.clone(), "bm spawn")?;
    assert_eq!(source.plain_lines(), ["second"]);
    Ok(())
}

#[test]
fn test_nested_module_registers_under_full_path() -> Result<()> {
    let mut root = command_module("bettermodel", |module| {
        module.with_aliases(["bm"]);
    });
    let debug = root.command_module("debug", |module| {
        module.executes(|ctx| {
            ctx.source().info("debug entry");
            Ok(())
        });
        module.command("dump", |cmd| {
            cmd.executes(|ctx| {
                ctx.source().info("dumped");
                Ok(())
            });
        });
    });
    root.command("version", |_| {});

    let mut registry = CommandRegistry::new();
    root.build(&mut registry);
    let debug = debug.build(&mut registry);
    assert_eq!(debug.root_name(), "bettermodel debug");

    let source = Arc::new(BufferedSource::new("tester"));
    registry.execute(source.clone(), "bm debug")?;
    registry.execute(source.clone(), "bm debug dump")?;
    assert_eq!(source.plain_lines(), ["debug entry", "dumped"]);

    source.clear();
    registry.execute(source.clone(), "bm debug help")?;
    assert!(source
        .plain_lines()
        .contains(&"/bettermodel debug [help] [page] - help command.".to_string()));
    Ok(())
}

#[test]
fn test_subcommand_permission_is_enforced_by_registry() {
    let mut registry = CommandRegistry::new();
    bettermodel().build(&mut registry);
    let source = Arc::new(BufferedSource::with_permissions(
        "guest",
        ["bettermodel", "bettermodel.version"],
    ));

    assert!(registry.execute(source.clone(), "bm version").is_ok());
    assert!(matches!(
        registry.execute(source, "bm reload"),
        Err(Error::PermissionDenied(p)) if p == "bettermodel.reload"
    ));
}

#[test]
fn test_concurrent_first_help_access_renders_once() {
    let module = Arc::new(bettermodel());

    let pointers: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let module = Arc::clone(&module);
                scope.spawn(move || std::ptr::from_ref(module.help_pages()) as usize)
            })
            .collect();
        handles
            .into_iter()
            .filter_map(|handle| handle.join().ok())
            .collect()
    });

    assert_eq!(pointers.len(), 8);
    assert!(pointers.windows(2).all(|pair| pair[0] == pair[1]));
}
