use clap::Parser;
use topsites::cli::{Cli, Command};
use topsites::config::Config;
use topsites::host::{
    Bookmarks, BookmarkList, Collaborators, DiskFiles, FileRenderTarget, FixedHistoryAge, NoBookmarks,
    SystemClock,
};
use topsites::report;
use topsites::TopSitesManager;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn collaborators(config: &Config) -> Collaborators {
    let bookmarks: Box<dyn Bookmarks> = match &config.bookmarks_file {
        Some(path) => match BookmarkList::from_file(path) {
            Ok(list) => Box::new(list),
            Err(e) => {
                log::warn!("{e}, bookmark filters will match nothing");
                Box::new(NoBookmarks)
            }
        },
        None => Box::new(NoBookmarks),
    };

    Collaborators {
        files: Box::new(DiskFiles),
        bookmarks,
        preferences: Box::new(FixedHistoryAge(config.history_age_days())),
        clock: Box::new(SystemClock),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::from_cli(&cli).unwrap_or_else(|e| {
        eprintln!("Error loading config: {e}");
        std::process::exit(1);
    });

    if let Some(parent) = config.db_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            log::warn!("cannot create {}: {e}", parent.display());
        }
    }

    let mut manager = TopSitesManager::open(&config, collaborators(&config));

    if !manager.is_open() {
        eprintln!("Top sites database unavailable at {}.", config.db_path.display());
        std::process::exit(1);
    }

    match cli.command {
        Command::Visit(_) | Command::Render(_) if !manager.is_enabled() => {
            eprintln!("Top sites are disabled by the config or {}.", topsites::config::DISABLE_ENV);
            std::process::exit(1);
        }
        Command::Visit(args) => {
            let mut target = FileRenderTarget::new(args.screenshot, args.output);
            manager.update(&mut target, &args.url, &args.title);

            if cli.verbose && manager.contains(&args.url) {
                eprintln!(
                    "{}: {} visits, thumbnail {}",
                    args.url,
                    manager.visit_count(&args.url),
                    if manager.has_screenshot(&args.url) { "cached" } else { "missing" }
                );
            }
        }
        Command::Render(args) => {
            let mut target = FileRenderTarget::new(None, args.output);
            manager.generate_template(&mut target, &args.origin);

            if target.pages_loaded() == 0 {
                eprintln!(
                    "No page generated. Check that the templates exist in {}.",
                    config.resource_dir.display()
                );
                std::process::exit(1);
            }
        }
        Command::List(args) => {
            report::print(&manager.ranked_sites(), &manager.settings(), args.json);
        }
        Command::Remove(args) => {
            if manager.remove(&args.url) {
                println!("removed {}", args.url);
            } else {
                eprintln!("{} is not a recorded site", args.url);
                std::process::exit(1);
            }
        }
        Command::Prune => {
            let before = manager.entries();
            manager.prune_older_entries();
            let after = manager.entries();
            println!("{} sites expired, {after} kept", before - after);
        }
        Command::Settings(args) => {
            if let Some(mode) = args.display_mode {
                manager.set_display_mode(mode.into());
            }
            if let Some(n) = args.max_entries {
                manager.set_max_entries(n);
            }
            if let Some(mode) = args.filter_mode {
                manager.set_filter_mode(mode.into());
            }
            if let Some(width) = args.screenshot_size {
                manager.set_screenshot_size(width);
            }

            if args.has_changes() {
                println!("settings updated\n");
            }
            report::print_settings(&manager.settings());
        }
    }
}
