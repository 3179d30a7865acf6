use grouprole::application::GroupProvisioningService;
use grouprole::config::Config;
use grouprole::domain::group_role::{GroupRole, GroupRoleRepository};
use grouprole::domain::permission::{PermissionResolver, ProviderStage};
use grouprole::infrastructure::persistence::InMemoryGroupRoleRepository;
use grouprole::infrastructure::telemetry::{init_tracing, install_metrics_recorder};
use grouprole::infrastructure::{
    ConfiguredDefaultRoles, ConfiguredPermissions, ConfiguredRegistry, PlaceholderTitleFormatter,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[cfg(feature = "postgres")]
use grouprole::infrastructure::persistence::{
    create_pool, run_migrations, DatabaseConfig, PgGroupRoleRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional config file path as the only argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    init_tracing(&config.logging.level)?;
    let prometheus_handle = install_metrics_recorder()?;

    info!("Starting grouprole");
    debug!("Effective configuration:\n{}", config.to_toml()?);

    let registry = Arc::new(ConfiguredRegistry::from_config(&config.registry)?);
    let resolver = Arc::new(
        PermissionResolver::new(
            registry.clone(),
            registry,
            Arc::new(PlaceholderTitleFormatter),
        )
        .with_administrator(
            config.permissions.administrator_role.as_str(),
            config.permissions.administrator_label.as_str(),
        )
        .with_permission_provider(
            ProviderStage::After,
            Arc::new(ConfiguredPermissions::new(config.permissions.permissions.clone())),
        )
        .with_default_role_provider(Arc::new(ConfiguredDefaultRoles::new(
            config.permissions.default_roles.clone(),
        ))),
    );

    let repository = build_repository(&config).await?;
    let service = GroupProvisioningService::new(resolver.clone(), repository.clone());

    let group_bundles = config.group_bundles();
    if group_bundles.is_empty() {
        warn!("No group content configured, nothing to provision");
    }

    for (group_type, group_bundle) in &group_bundles {
        let catalog = resolver.resolve_permissions(group_type, group_bundle)?;
        for (name, entry) in catalog.iter() {
            info!(
                group_type = %group_type,
                group_bundle = %group_bundle,
                permission = name,
                title = entry.title(),
                "Permission available"
            );
        }

        // The second run finds every role in place
        for _ in 0..2 {
            let report = service.provision(group_type, group_bundle, None).await?;
            info!(
                created = report.created.len(),
                skipped = report.skipped.len(),
                "Provisioning report"
            );
        }

        for role in GroupRole::load_by_scope(&*repository, group_type, group_bundle, None).await? {
            info!(
                role_id = role.id(),
                label = role.label(),
                is_admin = role.is_admin(),
                permissions = role.permissions().len(),
                "Group role"
            );
        }
    }

    info!("Metrics:\n{}", prometheus_handle.render());
    info!("grouprole finished");
    Ok(())
}

#[cfg(feature = "postgres")]
async fn build_repository(config: &Config) -> anyhow::Result<Arc<dyn GroupRoleRepository>> {
    if !config.database.enabled {
        info!("Using in-memory group role repository");
        return Ok(Arc::new(InMemoryGroupRoleRepository::new()));
    }

    info!("Initializing database connection...");
    let pool = create_pool(&DatabaseConfig::with_url(config.database.url.as_str())).await?;
    run_migrations(&pool).await?;
    info!("Database migrations completed");

    Ok(Arc::new(PgGroupRoleRepository::new(pool)))
}

#[cfg(not(feature = "postgres"))]
async fn build_repository(config: &Config) -> anyhow::Result<Arc<dyn GroupRoleRepository>> {
    if config.database.enabled {
        warn!("Built without the postgres feature, ignoring [database]");
    }
    Ok(Arc::new(InMemoryGroupRoleRepository::new()))
}
