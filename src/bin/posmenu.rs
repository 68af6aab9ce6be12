use position_menus::config::{default_settings_path, load_or_create_settings, MenuSettings};
use position_menus::host::{
    Actor, InMemoryRecordStore, Localizer, MessageSink, PermissionResolver, TeleportService,
};
use position_menus::locale::Locales;
use position_menus::menu::{Capability, Collaborators, ListMenu, MenuContext};
use position_menus::position::{
    Coordinate, MenuType, Owner, PositionKind, PositionMeta, PositionVariant, SavedPosition,
};
use position_menus::shared::ids::{ActorId, IconRef, PositionId};
use position_menus::shared::logging::EventLog;
use position_menus::tui::{
    run_terminal_session, PromptFieldEditor, TerminalSession, TerminalSurface,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

const USAGE: &str = "usage: posmenu [--config <path>] [--positions <path>] [--actor <id>] \
[--holding <icon>] [--list owned|public|shared] [--admin]";

#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    positions: Option<PathBuf>,
    actor: Option<String>,
    holding: Option<String>,
    list: Option<String>,
    admin: bool,
}

fn parse_options(args: Vec<String>) -> Result<Options, String> {
    let mut options = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .ok_or_else(|| format!("`{flag}` requires a value\n{USAGE}"))
        };
        match arg.as_str() {
            "--config" => options.config = Some(PathBuf::from(value("--config")?)),
            "--positions" => options.positions = Some(PathBuf::from(value("--positions")?)),
            "--actor" => options.actor = Some(value("--actor")?),
            "--holding" => options.holding = Some(value("--holding")?),
            "--list" => options.list = Some(value("--list")?),
            "--admin" => options.admin = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("unknown argument `{other}`\n{USAGE}")),
        }
    }
    Ok(options)
}

fn parse_menu_type(raw: Option<&str>) -> Result<MenuType, String> {
    match raw.unwrap_or("owned") {
        "owned" => Ok(MenuType::Owned),
        "public" => Ok(MenuType::SharedReadPublicCopy),
        "shared" => Ok(MenuType::Shared),
        other => Err(format!("unknown list `{other}`\n{USAGE}")),
    }
}

struct TerminalTeleporter {
    surface: Rc<TerminalSurface>,
}

impl TeleportService for TerminalTeleporter {
    fn teleport(&self, actor: &Actor, position: &SavedPosition) {
        let (x, y, z) = position.coordinate.block();
        self.surface.send_message(
            &actor.id,
            &format!(
                "Teleported to {} ({} {x} {y} {z})",
                position.name(),
                position.coordinate.world
            ),
        );
    }
}

struct DemoPermissions {
    admin: bool,
}

impl PermissionResolver for DemoPermissions {
    fn has_capability(&self, _actor: &Actor, capability: Capability) -> bool {
        match capability {
            Capability::EditOwn | Capability::EditShared => true,
            Capability::EditOthers => self.admin,
        }
    }
}

fn sample_positions(actor: &Actor) -> Result<Vec<SavedPosition>, String> {
    let id = |raw: &str| PositionId::parse(raw);
    let owner = |actor_id: &ActorId, username: &str| Owner {
        id: actor_id.clone(),
        username: username.to_string(),
    };
    let spot = |x: f64, z: f64| Coordinate {
        world: "world".to_string(),
        x,
        y: 64.0,
        z,
        yaw: 0.0,
        pitch: 0.0,
    };
    let neighbour = ActorId::parse("steve")?;

    let mut positions = Vec::new();
    for n in 0..25 {
        positions.push(SavedPosition {
            id: id(&format!("home-{n}"))?,
            meta: PositionMeta {
                name: format!("home{n}"),
                description: if n % 3 == 0 {
                    String::new()
                } else {
                    format!("Home number {n}, somewhere near the spawn chunks")
                },
                tags: BTreeMap::new(),
            },
            coordinate: spot(f64::from(n) * 16.5, -f64::from(n) * 8.25),
            server: "survival".to_string(),
            variant: PositionVariant::Owned {
                owner: owner(&actor.id, &actor.username),
                public: n % 4 == 0,
            },
        });
    }
    for (n, name) in ["farm", "tower"].into_iter().enumerate() {
        positions.push(SavedPosition {
            id: id(&format!("steve-{n}"))?,
            meta: PositionMeta {
                name: name.to_string(),
                description: "Steve's place".to_string(),
                tags: BTreeMap::new(),
            },
            coordinate: spot(-200.0 - n as f64, 40.0),
            server: "survival".to_string(),
            variant: PositionVariant::Owned {
                owner: owner(&neighbour, "Steve"),
                public: true,
            },
        });
    }
    for name in ["spawn", "market", "arena"] {
        positions.push(SavedPosition {
            id: id(name)?,
            meta: PositionMeta {
                name: name.to_string(),
                ..PositionMeta::default()
            },
            coordinate: spot(0.0, 0.0),
            server: "hub".to_string(),
            variant: PositionVariant::Shared,
        });
    }
    Ok(positions)
}

fn load_positions(options: &Options, actor: &Actor) -> Result<Vec<SavedPosition>, String> {
    let Some(path) = &options.positions else {
        return sample_positions(actor);
    };
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("failed to read positions {}: {e}", path.display()))?;
    serde_yaml::from_str(&raw)
        .map_err(|e| format!("failed to parse positions {}: {e}", path.display()))
}

fn listed_positions(
    store: &InMemoryRecordStore,
    menu_type: MenuType,
    actor: &Actor,
) -> Vec<SavedPosition> {
    match menu_type {
        MenuType::Owned => store
            .all()
            .into_iter()
            .filter(|position| position.is_owned_by(&actor.id))
            .collect(),
        MenuType::SharedReadPublicCopy => store.public_owned(),
        MenuType::Shared => store.of_kind(PositionKind::Shared),
    }
}

fn load_locales(settings: &MenuSettings) -> Result<Locales, String> {
    match &settings.locales {
        Some(path) => Locales::from_path(path).map_err(|e| e.to_string()),
        None => Ok(Locales::default()),
    }
}

fn run() -> Result<(), String> {
    let options = parse_options(std::env::args().skip(1).collect())?;
    let config_path = match &options.config {
        Some(path) => path.clone(),
        None => default_settings_path().map_err(|e| e.to_string())?,
    };
    let settings = load_or_create_settings(&config_path).map_err(|e| e.to_string())?;
    let menu_type = parse_menu_type(options.list.as_deref())?;

    let actor_id = ActorId::parse(options.actor.as_deref().unwrap_or("alex"))?;
    let held = options
        .holding
        .as_deref()
        .map(IconRef::parse)
        .transpose()?;
    let actor = Actor::new(actor_id.clone(), actor_id.as_str()).holding(held);

    let store = InMemoryRecordStore::with_positions(load_positions(&options, &actor)?);
    let surface = Rc::new(TerminalSurface::new());
    let standing = Coordinate {
        world: "world".to_string(),
        x: 128.0,
        y: 72.0,
        z: -64.0,
        yaw: 0.0,
        pitch: 0.0,
    };
    let prompt = Rc::new(PromptFieldEditor::new(store.clone(), standing));
    let events = match &settings.logging.event_log {
        Some(path) => EventLog::to_file(path),
        None => EventLog::disabled(),
    };
    let locales = load_locales(&settings)?;
    let title = match menu_type {
        MenuType::Owned => "owned_list_title",
        MenuType::SharedReadPublicCopy => "public_list_title",
        MenuType::Shared => "shared_list_title",
    };
    let title = locales.resolve(title, &[]);

    let ctx = MenuContext::new(
        settings,
        Collaborators {
            store: Rc::new(store.clone()),
            teleporter: Rc::new(TerminalTeleporter {
                surface: Rc::clone(&surface),
            }),
            permissions: Rc::new(DemoPermissions {
                admin: options.admin,
            }),
            locales: Rc::new(locales),
            surface: surface.clone(),
            messages: surface.clone(),
            field_editor: prompt.clone(),
        },
        events,
    );
    let home = ListMenu::from_positions(
        &ctx,
        title,
        menu_type,
        listed_positions(&store, menu_type, &actor),
    )
    .map_err(|e| e.to_string())?;

    let session = TerminalSession::new(ctx, surface, prompt, actor, home);
    run_terminal_session(&session)
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
