//! a11y-prefs: inspect and edit the stored accessibility preferences

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    cli::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use a11y_assist::core::reflector::{
        PROP_FONT_SIZE, PROP_LETTER_SPACING, PROP_LINE_HEIGHT, THEME_ATTRIBUTE,
    };
    use a11y_assist::platform::headless::{DocumentState, HeadlessDocument, HeadlessHost};
    use a11y_assist::storage::{
        FileStorage, JsonPreferenceStore, KeyValueStorage, PreferenceStore, PREFS_STORAGE_KEY,
    };
    use a11y_assist::ui::{format_percent, labels, Language};
    use a11y_assist::{
        DomReflector, MenuController, MenuOptions, PreferenceSnapshot, PreferenceUpdate,
    };
    use clap::{Arg, ArgAction, ArgMatches, Command};
    use std::path::PathBuf;
    use std::rc::Rc;

    fn command() -> Command {
        Command::new("a11y-prefs")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Inspect and edit stored accessibility preferences")
            .arg(
                Arg::new("dir")
                    .long("dir")
                    .global(true)
                    .value_parser(clap::value_parser!(PathBuf))
                    .help("Preference directory (default: $XDG_CONFIG_HOME/a11y-assist)"),
            )
            .arg(
                Arg::new("lang")
                    .long("lang")
                    .global(true)
                    .value_parser(["es", "en"])
                    .help("Label language (default: stored `lang`, else es)"),
            )
            .subcommand(
                Command::new("show")
                    .about("Print the stored preferences")
                    .arg(
                        Arg::new("json")
                            .long("json")
                            .action(ArgAction::SetTrue)
                            .help("Print the raw JSON record"),
                    )
                    .arg(
                        Arg::new("dom")
                            .long("dom")
                            .action(ArgAction::SetTrue)
                            .help("Also print the document markers the record produces"),
                    ),
            )
            .subcommand(
                Command::new("set")
                    .about("Change one or more preferences (camelCase key=value)")
                    .arg(
                        Arg::new("pairs")
                            .required(true)
                            .num_args(1..)
                            .value_name("KEY=VALUE"),
                    ),
            )
            .subcommand(Command::new("reset").about("Restore the defaults"))
            .subcommand(Command::new("zoom-in").about("Increase text size by one step"))
            .subcommand(Command::new("zoom-out").about("Decrease text size by one step"))
            .subcommand(Command::new("path").about("Print the preference file location"))
    }

    pub fn run() {
        // warn by default, RUST_LOG overrides
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

        let matches = command().get_matches();
        if let Err(e) = dispatch(&matches) {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }

    fn dispatch(matches: &ArgMatches) -> Result<(), String> {
        let storage = match matches.get_one::<PathBuf>("dir") {
            Some(dir) => FileStorage::new(dir.clone()),
            None => FileStorage::user_default(),
        };
        let language = match matches.get_one::<String>("lang") {
            Some(code) => Language::from_code(code),
            None => Language::from_storage(&storage),
        };

        match matches.subcommand() {
            Some(("path", _)) => {
                println!("{}", storage.path_for(PREFS_STORAGE_KEY).display());
                Ok(())
            }
            Some(("set", args)) => {
                let mut changes = PreferenceUpdate::new();
                for pair in args.get_many::<String>("pairs").into_iter().flatten() {
                    let (key, value) = pair
                        .split_once('=')
                        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", pair))?;
                    changes = changes.set_field(key.trim(), value.trim())?;
                }
                let (_host, mut menu) = open(&storage, language);
                let prefs = menu.update(&changes);
                print_snapshot(&prefs, language);
                Ok(())
            }
            Some(("reset", _)) => edit(&storage, language, MenuController::reset),
            Some(("zoom-in", _)) => edit(&storage, language, MenuController::zoom_in),
            Some(("zoom-out", _)) => edit(&storage, language, MenuController::zoom_out),
            Some(("show", args)) => show(&storage, language, args),
            _ => show(&storage, language, &ArgMatches::default()),
        }
    }

    /// Controller over a headless document, persisting to `storage`.
    /// Behaviours never run here; the host only records their effects.
    fn open(storage: &FileStorage, language: Language) -> (HeadlessHost, MenuController) {
        let host = HeadlessHost::default().without_speech();
        let menu = MenuController::new(
            host.capabilities(),
            Box::new(JsonPreferenceStore::new(storage.clone())),
            MenuOptions::new().with_language(language),
        );
        (host, menu)
    }

    fn edit(
        storage: &FileStorage,
        language: Language,
        action: fn(&mut MenuController) -> PreferenceSnapshot,
    ) -> Result<(), String> {
        let (_host, mut menu) = open(storage, language);
        let prefs = action(&mut menu);
        print_snapshot(&prefs, language);
        Ok(())
    }

    fn show(storage: &FileStorage, language: Language, args: &ArgMatches) -> Result<(), String> {
        let json = args.try_get_one::<bool>("json").ok().flatten().copied().unwrap_or(false);
        let dom = args.try_get_one::<bool>("dom").ok().flatten().copied().unwrap_or(false);

        if json {
            let raw = storage
                .get_item(PREFS_STORAGE_KEY)
                .map_err(|e| e.to_string())?;
            println!("{}", raw.unwrap_or_else(|| "{}".to_string()));
            return Ok(());
        }

        // read-only: no controller, so the record is never rewritten
        let store = JsonPreferenceStore::new(storage.clone());
        let prefs = store.load();
        print_snapshot(&prefs, language);
        if dom {
            let document = Rc::new(HeadlessDocument::new());
            DomReflector::new(document.clone(), Box::new(store)).reflect(&prefs);
            print_document(&document.state());
        }
        Ok(())
    }

    fn on_off(on: bool, language: Language) -> &'static str {
        match (on, language) {
            (true, Language::Es) => "sí",
            (false, Language::Es) => "no",
            (true, Language::En) => "on",
            (false, Language::En) => "off",
        }
    }

    fn print_snapshot(prefs: &PreferenceSnapshot, language: Language) {
        let l = labels(language);
        println!("{}", l.title);
        println!("  {:<24}{}", l.theme_legend, l.theme(prefs.theme));
        println!("  {:<24}{}", l.font_legend, l.font(prefs.font_type));
        println!("  {:<24}{}", l.zoom, format_percent(prefs.font_size.get()));
        println!("  {:<24}{}em", l.letter, prefs.letter_spacing.get());
        println!("  {:<24}{}", l.line, prefs.line_height.get());
        for (label, on) in [
            (l.underline, prefs.underline_links),
            (l.targets, prefs.large_targets),
            (l.hover_speak, prefs.hover_speak),
            (l.visual_alerts, prefs.visual_alerts),
            (l.pause_animations, prefs.pause_animations),
            (l.enhanced_focus, prefs.enhanced_focus),
            (l.auto_scroll, prefs.auto_scroll),
        ] {
            println!("  {:<24}{}", label, on_off(on, language));
        }
    }

    fn print_document(state: &DocumentState) {
        println!();
        println!(
            "  <html {}=\"{}\">",
            THEME_ATTRIBUTE,
            state.root_attributes.get(THEME_ATTRIBUTE).map_or("", String::as_str)
        );
        for property in [PROP_FONT_SIZE, PROP_LETTER_SPACING, PROP_LINE_HEIGHT] {
            if let Some((value, _)) = state.root_styles.get(property) {
                println!("    {}: {}", property, value);
            }
        }
        let classes: Vec<&str> = state.body_classes.iter().map(String::as_str).collect();
        println!("  <body class=\"{}\">", classes.join(" "));
    }

}
