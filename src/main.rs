//! Bulldog Realm entry point
//!
//! The web build is driven by page scripts through the `BRState` bindings in
//! the library. Natively this runs one "session" against a save directory:
//! apply the commands given on the command line, flush as if the page were
//! unloading, print the resulting state.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use bulldog_realm::persistence::StateStore;
    use bulldog_realm::platform::{FileStorage, LifecycleEvent, SystemClock};
    use bulldog_realm::{Action, Character, PetState, StoreConfig};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dir = std::env::var("BULLDOG_REALM_SAVE_DIR")
        .unwrap_or_else(|_| ".bulldog-realm".to_string());
    let mut store = StateStore::init(
        &PetState::default(),
        FileStorage::new(dir),
        SystemClock,
        StoreConfig::default(),
    );
    log::info!(
        "Bulldog Realm (native) using save dir {}",
        store.storage().dir().display()
    );

    for arg in std::env::args().skip(1) {
        if arg == "reset" {
            if let Err(e) = store.clear() {
                log::warn!("Could not clear save: {}", e);
            }
            *store.state_mut() = PetState::default();
            continue;
        }

        if let Some(name) = arg.strip_prefix("select:") {
            match Character::from_str(name) {
                Some(character) => {
                    store.update(|pet| pet.select_character(character));
                    log::info!("Selected {}", character.display_name());
                }
                None => log::warn!("Unknown character: {}", name),
            }
            continue;
        }

        let Some(action) = Action::from_str(&arg) else {
            log::warn!("Unknown command: {}", arg);
            continue;
        };
        if store.state().selected_char.is_none() {
            log::warn!("Pick a character first (select:shadow|cotton|titan)");
            continue;
        }
        store.update(|pet| pet.apply(action));
        log::info!("Did {}", action.as_str());
    }

    // Process exit is this session's unload
    store.handle_lifecycle(LifecycleEvent::BeforeUnload);

    match serde_json::to_string_pretty(store.state()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Could not print state: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is bindings::start, this is just to satisfy the compiler
}
