//! Role change dispatcher
//!
//! Entry point for member update events. Filters out updates that do not
//! touch any tracked role and debounces the rest per member, so a burst of
//! role edits produces a single sync pass.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

use crate::application::debounce::Debouncer;
use crate::application::role_sync::RoleSync;
use crate::domain::value_objects::{MemberId, RoleId};
use crate::ports::{MemberGateway, PanelGateway};

/// A member's role set changed (or may have changed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleChange {
    pub member_id: MemberId,
    /// Roles before the change, when the platform reports them
    pub old_roles: Option<BTreeSet<RoleId>>,
    pub new_roles: BTreeSet<RoleId>,
}

impl RoleChange {
    pub fn new(member_id: MemberId, new_roles: impl IntoIterator<Item = RoleId>) -> Self {
        Self {
            member_id,
            old_roles: None,
            new_roles: new_roles.into_iter().collect(),
        }
    }

    pub fn with_old_roles(mut self, old_roles: impl IntoIterator<Item = RoleId>) -> Self {
        self.old_roles = Some(old_roles.into_iter().collect());
        self
    }
}

/// Debounced dispatcher of role changes to [`RoleSync`]
pub struct RoleChangeDispatcher<G>
where
    G: MemberGateway + PanelGateway + 'static,
{
    sync: Arc<RoleSync<G>>,
    debouncer: Debouncer<MemberId>,
    last_seen: Mutex<HashMap<MemberId, BTreeSet<RoleId>>>,
}

impl<G> RoleChangeDispatcher<G>
where
    G: MemberGateway + PanelGateway + 'static,
{
    pub fn new(sync: Arc<RoleSync<G>>, window: Duration) -> Self {
        Self {
            sync,
            debouncer: Debouncer::new(window),
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    /// Offer a role change. Returns whether a pass was scheduled.
    pub fn handle(&self, change: RoleChange) -> bool {
        let table = self.sync.table();
        let current = table.tracked(&change.new_roles);

        let previous = {
            let mut last_seen = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
            let remembered = last_seen.insert(change.member_id, current.clone());
            change.old_roles.map(|old| table.tracked(&old)).or(remembered)
        };

        if previous.as_ref() == Some(&current) {
            debug!(member_id = %change.member_id, "Tracked roles unchanged, ignoring update");
            return false;
        }

        let sync = self.sync.clone();
        let member_id = change.member_id;
        self.debouncer.schedule(member_id, async move {
            sync.run_pass(member_id).await;
        });
        true
    }

    /// A member left the guild: forget them and refresh the panel
    pub fn handle_departure(&self, member_id: MemberId) {
        let held_tracked_role = self
            .last_seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&member_id)
            .map_or(true, |roles| !roles.is_empty());

        if !held_tracked_role {
            return;
        }

        let sync = self.sync.clone();
        self.debouncer.schedule(member_id, async move {
            sync.run_panel_pass().await;
        });
    }

    /// Passes currently waiting out the debounce window
    pub fn waiting(&self) -> usize {
        self.debouncer.waiting()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::FakeGuild;
    use crate::application::panel::PanelSlot;
    use crate::domain::entities::Member;
    use crate::domain::value_objects::{ChannelId, RolePrefix, RolePrefixTable};

    const ADMIN: RoleId = RoleId(1);
    const MOD: RoleId = RoleId(2);
    const UNTRACKED: RoleId = RoleId(99);
    const WINDOW: Duration = Duration::from_secs(1);

    fn setup() -> (Arc<FakeGuild>, RoleChangeDispatcher<FakeGuild>) {
        let (guild, _panel, dispatcher) = setup_with_panel();
        (guild, dispatcher)
    }

    fn setup_with_panel() -> (
        Arc<FakeGuild>,
        Arc<PanelSlot<FakeGuild>>,
        RoleChangeDispatcher<FakeGuild>,
    ) {
        let guild = Arc::new(FakeGuild::new().with_roles(&[1, 2, 99]));
        let table = Arc::new(
            RolePrefixTable::new(vec![
                RolePrefix::new(ADMIN, "[A]"),
                RolePrefix::new(MOD, "[B]"),
            ])
            .unwrap(),
        );
        let panel = Arc::new(PanelSlot::new(guild.clone(), ChannelId(1)));
        let sync = Arc::new(RoleSync::new(guild.clone(), table, panel.clone()));
        (guild, panel, RoleChangeDispatcher::new(sync, WINDOW))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_changes_runs_one_pass() {
        let (guild, dispatcher) = setup();
        let id = MemberId(5);
        guild.upsert_member(Member::new(id, "John").with_roles([ADMIN, MOD]));

        assert!(dispatcher.handle(RoleChange::new(id, [MOD])));
        assert!(dispatcher.handle(RoleChange::new(id, [MOD, ADMIN])));
        assert!(dispatcher.handle(RoleChange::new(id, [ADMIN])));
        assert_eq!(dispatcher.waiting(), 1);

        tokio::time::sleep(WINDOW * 2).await;

        assert_eq!(guild.renames(), vec![(id, "[A] John".to_string())]);
        assert_eq!(guild.sends(), 1);
        assert_eq!(guild.edits(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_untracked_role_changes_are_ignored() {
        let (_guild, dispatcher) = setup();
        let id = MemberId(6);

        assert!(!dispatcher.handle(RoleChange::new(id, [UNTRACKED]).with_old_roles([])));
        assert!(dispatcher.handle(RoleChange::new(id, [UNTRACKED, MOD])));
        assert!(!dispatcher.handle(RoleChange::new(id, [MOD])));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_sighting_is_always_dispatched() {
        let (_guild, dispatcher) = setup();
        assert!(dispatcher.handle(RoleChange::new(MemberId(7), [])));
        assert!(!dispatcher.handle(RoleChange::new(MemberId(7), [])));
    }

    #[tokio::test(start_paused = true)]
    async fn test_departure_refreshes_panel() {
        let (guild, dispatcher) = setup();
        let id = MemberId(8);
        guild.upsert_member(Member::new(id, "Ana").with_roles([MOD]));
        dispatcher.handle(RoleChange::new(id, [MOD]));
        tokio::time::sleep(WINDOW * 2).await;
        assert_eq!(guild.sends(), 1);

        guild.remove_member(id);
        dispatcher.handle_departure(id);
        tokio::time::sleep(WINDOW * 2).await;

        assert_eq!(guild.edits(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_member_without_nickname_is_never_renamed() {
        let (guild, dispatcher) = setup();
        let id = MemberId(10);
        guild.upsert_member(Member::new(id, "Bia").with_roles([UNTRACKED]));

        assert!(dispatcher.handle(RoleChange::new(id, [UNTRACKED])));
        tokio::time::sleep(WINDOW * 2).await;

        // A role granted and revoked within one window leaves nothing to rename
        assert!(dispatcher.handle(RoleChange::new(id, [UNTRACKED, MOD])));
        assert!(dispatcher.handle(RoleChange::new(id, [UNTRACKED])));
        tokio::time::sleep(WINDOW * 2).await;

        assert!(guild.renames().is_empty());
        assert_eq!(guild.member_name(id), "Bia");
        assert_eq!(guild.sends(), 1);
        assert_eq!(guild.edits(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deleted_panel_is_replaced_once() {
        let (guild, panel, dispatcher) = setup_with_panel();
        let id = MemberId(11);
        guild.upsert_member(Member::new(id, "Caio").with_roles([MOD]));

        dispatcher.handle(RoleChange::new(id, [MOD]));
        tokio::time::sleep(WINDOW * 2).await;
        let first = panel.state().await.message_id().unwrap();
        assert_eq!(guild.sends(), 1);

        guild.delete_message(first);
        guild.upsert_member(Member::new(id, "Caio").with_roles([ADMIN]));
        dispatcher.handle(RoleChange::new(id, [ADMIN]));
        tokio::time::sleep(WINDOW * 2).await;

        let second = panel.state().await.message_id().unwrap();
        assert_ne!(second, first);
        assert!(guild.message_exists(second));
        assert_eq!(guild.sends(), 2);
        assert_eq!(guild.edits(), 0);

        guild.upsert_member(Member::new(id, "Caio").with_roles([MOD]));
        dispatcher.handle(RoleChange::new(id, [MOD]));
        tokio::time::sleep(WINDOW * 2).await;

        assert_eq!(panel.state().await.message_id(), Some(second));
        assert_eq!(guild.sends(), 2);
        assert_eq!(guild.edits(), 1);
    }
}
