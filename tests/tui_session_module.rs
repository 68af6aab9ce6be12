use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use position_menus::config::MenuSettings;
use position_menus::host::{
    Actor, InMemoryRecordStore, MessageSink, PermissionResolver, TeleportService,
};
use position_menus::locale::Locales;
use position_menus::menu::layout::{
    GridLayout, EDIT_NAME_SYMBOL, EDIT_VISIBILITY_SYMBOL, ITEM_SYMBOL, NEXT_PAGE_SYMBOL,
};
use position_menus::menu::{Capability, Collaborators, ListMenu, MenuContext};
use position_menus::position::{Coordinate, MenuType, Owner, PositionMeta, PositionVariant, SavedPosition};
use position_menus::shared::ids::{ActorId, PositionId};
use position_menus::shared::logging::EventLog;
use position_menus::tui::{PromptFieldEditor, SessionStep, TerminalSession, TerminalSurface};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use std::rc::Rc;
use std::time::{Duration, Instant};

struct AllowAll;

impl PermissionResolver for AllowAll {
    fn has_capability(&self, _actor: &Actor, _capability: Capability) -> bool {
        true
    }
}

struct Announce {
    surface: Rc<TerminalSurface>,
}

impl TeleportService for Announce {
    fn teleport(&self, actor: &Actor, position: &SavedPosition) {
        self.surface
            .send_message(&actor.id, &format!("Teleported to {}", position.name()));
    }
}

fn spot() -> Coordinate {
    Coordinate {
        world: "world".to_string(),
        x: 1.0,
        y: 64.0,
        z: 1.0,
        yaw: 0.0,
        pitch: 0.0,
    }
}

fn homes(owner: &Actor, count: usize) -> Vec<SavedPosition> {
    (0..count)
        .map(|n| SavedPosition {
            id: PositionId::parse(&format!("home-{n:02}")).expect("id"),
            meta: PositionMeta {
                name: format!("home{n:02}"),
                ..PositionMeta::default()
            },
            coordinate: spot(),
            server: "survival".to_string(),
            variant: PositionVariant::Owned {
                owner: Owner {
                    id: owner.id.clone(),
                    username: owner.username.clone(),
                },
                public: false,
            },
        })
        .collect()
}

struct Setup {
    session: TerminalSession,
    store: InMemoryRecordStore,
    ctx: Rc<MenuContext>,
    prompt: Rc<PromptFieldEditor>,
}

fn setup(count: usize) -> Setup {
    let actor = Actor::new(ActorId::parse("alex").expect("id"), "Alex");
    let positions = homes(&actor, count);
    let store = InMemoryRecordStore::with_positions(positions.clone());
    let surface = Rc::new(TerminalSurface::new());
    let standing = Coordinate {
        world: "world_nether".to_string(),
        x: -20.5,
        y: 40.0,
        z: 7.0,
        yaw: 0.0,
        pitch: 0.0,
    };
    let prompt = Rc::new(PromptFieldEditor::new(store.clone(), standing));
    let ctx = MenuContext::new(
        MenuSettings::default(),
        Collaborators {
            store: Rc::new(store.clone()),
            teleporter: Rc::new(Announce {
                surface: Rc::clone(&surface),
            }),
            permissions: Rc::new(AllowAll),
            locales: Rc::new(Locales::default()),
            surface: surface.clone(),
            messages: surface.clone(),
            field_editor: prompt.clone(),
        },
        EventLog::disabled(),
    );
    let home = ListMenu::from_positions(&ctx, "Homes", MenuType::Owned, positions)
        .expect("list menu");
    let session = TerminalSession::new(Rc::clone(&ctx), surface, Rc::clone(&prompt), actor, home);
    Setup {
        session,
        store,
        ctx,
        prompt,
    }
}

fn press(session: &TerminalSession, code: KeyCode) -> SessionStep {
    session.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_text(session: &TerminalSession, text: &str) {
    for ch in text.chars() {
        press(session, KeyCode::Char(ch));
    }
}

fn wait_for_completions(setup: &Setup) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while setup.ctx.completions().pending() > 0 && Instant::now() < deadline {
        setup.session.tick();
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn title(session: &TerminalSession) -> Option<String> {
    session.surface().view_model().map(|view| view.title)
}

#[test]
fn session_starts_on_home_list_and_pages_with_keys() {
    let setup = setup(25);
    let session = &setup.session;
    session.start();

    let view = session.surface().view_model().expect("list open");
    assert_eq!(view.title, "Homes");
    assert_eq!(view.page_line.as_deref(), Some("Page 1 / 2"));
    assert_eq!(view.grid.len(), 4);

    session
        .surface()
        .select(GridLayout::list(4).slots_of(NEXT_PAGE_SYMBOL)[0]);
    press(session, KeyCode::Enter);

    let view = session.surface().view_model().expect("list open");
    assert_eq!(view.page_line.as_deref(), Some("Page 2 / 2"));
}

#[test]
fn enter_on_item_teleports_and_closes() {
    let setup = setup(3);
    let session = &setup.session;
    session.start();
    session
        .surface()
        .select(GridLayout::list(4).slots_of(ITEM_SYMBOL)[1]);

    press(session, KeyCode::Enter);

    assert!(!session.surface().is_open());
    assert_eq!(
        session.surface().messages(),
        vec!["Teleported to home01".to_string()]
    );

    press(session, KeyCode::Char('o'));
    assert_eq!(title(session).as_deref(), Some("Homes"));
}

#[test]
fn rename_through_prompt_persists_and_reopens_editor() {
    let setup = setup(3);
    let session = &setup.session;
    session.start();
    session
        .surface()
        .select(GridLayout::list(4).slots_of(ITEM_SYMBOL)[0]);
    press(session, KeyCode::Char('e'));
    assert_eq!(title(session).as_deref(), Some("Editing home: home00"));

    session
        .surface()
        .select(GridLayout::editor().slots_of(EDIT_NAME_SYMBOL)[0]);
    press(session, KeyCode::Enter);
    assert!(!session.surface().is_open());
    assert!(setup.prompt.is_prompting());

    for _ in 0.."home00".len() {
        press(session, KeyCode::Backspace);
    }
    type_text(session, "villa");
    press(session, KeyCode::Enter);
    wait_for_completions(&setup);

    assert_eq!(title(session).as_deref(), Some("Editing home: villa"));
    let stored = setup
        .store
        .get(&PositionId::parse("home-00").expect("id"))
        .expect("stored record");
    assert_eq!(stored.name(), "villa");
}

#[test]
fn rejected_rename_keeps_old_name() {
    let setup = setup(3);
    let session = &setup.session;
    session.start();
    session
        .surface()
        .select(GridLayout::list(4).slots_of(ITEM_SYMBOL)[0]);
    press(session, KeyCode::Char('e'));
    session
        .surface()
        .select(GridLayout::editor().slots_of(EDIT_NAME_SYMBOL)[0]);
    press(session, KeyCode::Enter);

    for _ in 0.."home00".len() {
        press(session, KeyCode::Backspace);
    }
    type_text(session, "home01");
    press(session, KeyCode::Enter);
    wait_for_completions(&setup);

    assert_eq!(title(session).as_deref(), Some("Editing home: home00"));
}

#[test]
fn escape_cancels_prompt_and_returns_to_editor() {
    let setup = setup(1);
    let session = &setup.session;
    session.start();
    session
        .surface()
        .select(GridLayout::list(4).slots_of(ITEM_SYMBOL)[0]);
    press(session, KeyCode::Char('e'));
    session
        .surface()
        .select(GridLayout::editor().slots_of(EDIT_NAME_SYMBOL)[0]);
    press(session, KeyCode::Enter);

    assert_eq!(press(session, KeyCode::Esc), SessionStep::Continue);
    assert!(!setup.prompt.is_prompting());
    wait_for_completions(&setup);
    assert_eq!(title(session).as_deref(), Some("Editing home: home00"));
}

#[test]
fn visibility_toggle_reaches_store_before_menu_updates() {
    let setup = setup(1);
    let session = &setup.session;
    session.start();
    session
        .surface()
        .select(GridLayout::list(4).slots_of(ITEM_SYMBOL)[0]);
    press(session, KeyCode::Char('e'));
    session
        .surface()
        .select(GridLayout::editor().slots_of(EDIT_VISIBILITY_SYMBOL)[0]);
    press(session, KeyCode::Enter);
    wait_for_completions(&setup);

    let stored = setup
        .store
        .get(&PositionId::parse("home-00").expect("id"))
        .expect("stored record");
    assert_eq!(stored.visibility(), Some(true));
    let detail = session.surface().view_model().expect("editor open").detail;
    assert!(detail.contains(&"Currently: Public".to_string()));
}

#[test]
fn escape_closes_and_q_quits() {
    let setup = setup(2);
    let session = &setup.session;
    session.start();

    assert_eq!(press(session, KeyCode::Esc), SessionStep::Continue);
    assert!(!session.surface().is_open());
    assert_eq!(setup.ctx.router().open_menu(&session.actor().id), None);

    let backend = TestBackend::new(130, 20);
    let mut terminal = Terminal::new(backend).expect("terminal");
    terminal
        .draw(|frame| session.draw(frame))
        .expect("draw idle");
    let rendered: String = terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect();
    assert!(rendered.contains("No menu open."));

    assert_eq!(press(session, KeyCode::Char('q')), SessionStep::Quit);
}
