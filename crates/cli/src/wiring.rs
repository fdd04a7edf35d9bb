use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use events::EventBus;
use firestore::{FirestoreClient, FirestoreConfig};
use geopush_core::{
    Coordinates, LocalNotification, LocationProvider, PermissionKind, PermissionService,
    StaticPermissions,
};
use location::{FixedLocationProvider, IpLocationProvider, NoLocationProvider, PermissionedLocation};
use orchestrator::{Orchestrator, WorkflowClients, WorkflowConfig};
use push::{DeviceInfo, ExpoPushClient, ExpoTokenProvider, LocalNotifier};
use tracing::debug;

use crate::config::{AppConfig, LocationSource};

/// Everything a host surface needs after wiring.
pub struct App {
    pub orchestrator: Arc<Orchestrator>,
    pub event_bus: EventBus,
    pub notifier: Arc<LocalNotifier>,
}

pub fn build(config: &AppConfig) -> Result<App> {
    let http = http_client(config.http.timeout_secs)?;

    let permissions: Arc<dyn PermissionService> = Arc::new(
        StaticPermissions::new()
            .with(
                PermissionKind::Notifications,
                config.device.notifications.current,
                config.device.notifications.on_request,
            )
            .with(
                PermissionKind::ForegroundLocation,
                config.device.location.current,
                config.device.location.on_request,
            ),
    );

    let notifier = Arc::new(LocalNotifier::new(config.device.platform).with_display(print_notification));

    let mut device = DeviceInfo::new(config.device.platform, config.device.is_physical);
    if let Some(native) = &config.device.native_token {
        device = device.with_native_token(native.clone());
    }
    let token_provider = ExpoTokenProvider::new(&config.push.relay_url, device, permissions.clone())
        .with_client(http.clone())
        .with_project_id(config.push.project_id.clone())
        .with_app_id(config.push.app_id.clone())
        .with_development(config.push.development)
        .with_notifier(notifier.clone());

    let mut relay = ExpoPushClient::with_client(&config.push.relay_url, http.clone());
    if let Some(token) = &config.push.access_token {
        relay = relay.with_access_token(token.clone());
    }

    let mut store_config =
        FirestoreConfig::new(&config.firebase.project_id).with_base_url(&config.firebase.base_url);
    if let Some(key) = &config.firebase.api_key {
        store_config = store_config.with_api_key(key.clone());
    }
    let store = FirestoreClient::with_client(store_config, http.clone());

    let clients = WorkflowClients {
        token_provider: Arc::new(token_provider),
        location: location_provider(config, http, permissions),
        store: Arc::new(store),
        relay: Arc::new(relay),
        presenter: notifier.clone(),
    };

    let mut workflow = WorkflowConfig::default()
        .with_collection(&config.firebase.collection)
        .with_identity(config.identity.clone())
        .with_push_content(&config.push.title, &config.push.body)
        .with_trigger_policy(config.workflow.trigger_policy);
    workflow.summary_title = config.workflow.summary_title.clone();

    let event_bus = EventBus::new();
    let orchestrator = Arc::new(Orchestrator::new(clients, workflow).with_event_bus(event_bus.clone()));

    Ok(App {
        orchestrator,
        event_bus,
        notifier,
    })
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }
    builder.build().context("Failed to build HTTP client")
}

fn location_provider(
    config: &AppConfig,
    http: reqwest::Client,
    permissions: Arc<dyn PermissionService>,
) -> Arc<dyn LocationProvider> {
    debug!(provider = ?config.location.provider, "Location provider selected");
    match config.location.provider {
        LocationSource::Fixed => Arc::new(PermissionedLocation::new(
            FixedLocationProvider::new(Coordinates::new(
                config.location.latitude,
                config.location.longitude,
            )),
            permissions,
        )),
        LocationSource::Ip => Arc::new(PermissionedLocation::new(
            IpLocationProvider::with_client(&config.location.ip_endpoint, http),
            permissions,
        )),
        LocationSource::None => Arc::new(PermissionedLocation::new(NoLocationProvider, permissions)),
    }
}

fn print_notification(notification: &LocalNotification) {
    println!();
    println!("{} {}", "[notification]".cyan().bold(), notification.title.bold());
    for line in notification.body.lines() {
        println!("  {}", line);
    }
    println!();
}
