//! Notifications view model

use std::sync::Arc;

use aula_core::{views, Notification, NotificationId};
use aula_net::NotificationApi;
use futures::future::join_all;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::scope::ViewScope;
use crate::state::AppState;
use crate::store::{CollectionStore, InFlight};

pub struct NotificationsViewModel {
    state: AppState,
    scope: ViewScope,
    notifications: CollectionStore<Notification>,
    marking: InFlight<NotificationId>,
    marking_all: InFlight<()>,
}

impl NotificationsViewModel {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            scope: ViewScope::new(),
            notifications: CollectionStore::new("notifications"),
            marking: InFlight::new(),
            marking_all: InFlight::new(),
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn notifications(&self) -> &CollectionStore<Notification> {
        &self.notifications
    }

    pub async fn activate(&self) -> Result<()> {
        let user = self.state.session.user_id()?;
        self.notifications
            .activate(&self.scope, || {
                self.state.gateway.list_notifications(user, false)
            })
            .await?;
        Ok(())
    }

    pub async fn refresh(&self) -> Result<()> {
        let user = self.state.session.user_id()?;
        self.notifications
            .refresh(&self.scope, || {
                self.state.gateway.list_notifications(user, false)
            })
            .await?;
        Ok(())
    }

    pub fn unread(&self) -> Vec<Arc<Notification>> {
        views::unread(&self.notifications.snapshot())
    }

    pub fn unread_count(&self) -> usize {
        views::unread_count(&self.notifications.snapshot())
    }

    pub async fn mark_read(&self, id: NotificationId) -> Result<Arc<Notification>> {
        let _guard = self.marking.begin(id)?;
        let updated = self
            .scope
            .run(self.state.gateway.mark_read(id))
            .await
            .ok_or(AppError::Cancelled)??;

        self.notifications.reconcile(vec![updated.clone()]);
        Ok(self
            .notifications
            .get(id)
            .unwrap_or_else(|| Arc::new(updated)))
    }

    /// Mark every unread notification read, one request each, applied as
    /// a single batch. Returns how many entries changed.
    ///
    /// Successes are kept even when some requests fail; the failures are
    /// reported as [`AppError::Partial`].
    pub async fn mark_all_read(&self) -> Result<usize> {
        let unread = self.unread();
        if unread.is_empty() {
            return Ok(0);
        }

        let _guard = self.marking_all.begin(())?;
        let total = unread.len();
        let requests = unread.iter().map(|n| self.state.gateway.mark_read(n.id));
        let results = self
            .scope
            .run(join_all(requests))
            .await
            .ok_or(AppError::Cancelled)?;

        let mut updated = Vec::with_capacity(total);
        for result in results {
            match result {
                Ok(notification) => updated.push(notification),
                Err(e) => warn!(error = %e, "Mark read failed"),
            }
        }
        let failed = total - updated.len();
        let changed = self.notifications.reconcile(updated);
        info!(changed, failed, "Marked notifications read");

        if failed > 0 {
            return Err(AppError::Partial { failed, total });
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::lock;
    use crate::testing::{notification, profile, state_with, FakeGateway};
    use aula_core::Role;

    fn loaded_gateway() -> Arc<FakeGateway> {
        let gateway = FakeGateway::new();
        lock(&gateway.notifications).extend((1..=6).map(|id| notification(id, id == 6)));
        gateway
    }

    async fn loaded_vm(gateway: &Arc<FakeGateway>) -> NotificationsViewModel {
        let vm = NotificationsViewModel::new(state_with(
            gateway.clone(),
            Some(profile(21, Role::Student)),
        ));
        vm.activate().await.unwrap();
        vm
    }

    #[tokio::test]
    async fn test_mark_all_is_one_revision() {
        let gateway = loaded_gateway();
        let vm = loaded_vm(&gateway).await;
        assert_eq!(vm.unread_count(), 5);
        let revision = vm.notifications().revision();

        let changed = vm.mark_all_read().await.unwrap();
        assert_eq!(changed, 5);
        assert_eq!(gateway.count("mark_read"), 5);
        assert_eq!(vm.unread_count(), 0);
        assert_eq!(vm.notifications().revision(), revision + 1);
    }

    #[tokio::test]
    async fn test_mark_all_keeps_successes() {
        let gateway = loaded_gateway();
        gateway.fail("mark_read:2");
        gateway.fail("mark_read:4");
        let vm = loaded_vm(&gateway).await;

        let err = vm.mark_all_read().await.unwrap_err();
        assert!(matches!(err, AppError::Partial { failed: 2, total: 5 }));
        let still_unread: Vec<_> = vm.unread().iter().map(|n| n.id.0).collect();
        assert_eq!(still_unread, vec![2, 4]);
    }

    #[tokio::test]
    async fn test_mark_all_with_nothing_unread() {
        let gateway = FakeGateway::new();
        lock(&gateway.notifications).push(notification(1, true));
        let vm = loaded_vm(&gateway).await;

        assert_eq!(vm.mark_all_read().await.unwrap(), 0);
        assert_eq!(gateway.count("mark_read"), 0);
    }

    #[tokio::test]
    async fn test_mark_one() {
        let gateway = loaded_gateway();
        let vm = loaded_vm(&gateway).await;
        let other = vm.notifications().get(NotificationId(2)).unwrap();

        let read = vm.mark_read(NotificationId(1)).await.unwrap();
        assert!(read.read);
        assert_eq!(vm.unread_count(), 4);
        assert!(Arc::ptr_eq(&other, &vm.notifications().get(NotificationId(2)).unwrap()));
    }
}
