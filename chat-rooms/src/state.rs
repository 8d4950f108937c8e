use std::{collections::BTreeMap, sync::Arc};

use log::info;
use tokio::sync::Mutex;

use crate::types::ChatRoom;

/// The room directory. Cloning is cheap; every connection task gets a handle.
#[derive(Debug, Clone)]
pub struct Db {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    /// Every read and write of the directory goes through this one lock and
    /// none of them await while holding it.
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    rooms: BTreeMap<String, ChatRoom>,
}

impl Default for Db {
    fn default() -> Self {
        Self::new()
    }
}

impl Db {
    pub fn new() -> Db {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                rooms: BTreeMap::new(),
            }),
        });
        Db { shared }
    }

    /// Registers `room`, returning whatever was registered under its name before.
    pub async fn make_room(&self, room: ChatRoom) -> Option<ChatRoom> {
        let mut state = self.shared.state.lock().await;
        let previous = state.rooms.insert(room.name.clone(), room);
        if let Some(previous) = &previous {
            info!("Replacing room {}", previous);
        }
        previous
    }

    pub async fn delete_room(&self, name: &str) -> Option<ChatRoom> {
        let mut state = self.shared.state.lock().await;
        state.rooms.remove(name)
    }

    /// Snapshot of every room, ordered by name.
    pub async fn rooms(&self) -> Vec<ChatRoom> {
        let state = self.shared.state.lock().await;
        state.rooms.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    fn room(name: &str, port: u16) -> ChatRoom {
        ChatRoom::new(name, Ipv4Addr::new(239, 0, 0, 1), port).unwrap()
    }

    #[tokio::test]
    async fn make_replaces_and_delete_removes() {
        let db = Db::new();

        assert_eq!(db.make_room(room("beta", 1)).await, None);
        assert_eq!(db.make_room(room("alpha", 2)).await, None);
        assert_eq!(db.make_room(room("beta", 3)).await, Some(room("beta", 1)));

        assert_eq!(db.rooms().await, vec![room("alpha", 2), room("beta", 3)]);

        assert_eq!(db.delete_room("alpha").await, Some(room("alpha", 2)));
        assert_eq!(db.delete_room("alpha").await, None);
        assert_eq!(db.rooms().await, vec![room("beta", 3)]);
    }
}
