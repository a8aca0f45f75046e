use gantry::{APP_MODULE, AppModule, features};

#[test]
fn compose_keeps_imports_in_order() {
    let root = AppModule::compose([]);
    assert_eq!(root.name(), APP_MODULE);
    assert!(root.imported().is_empty());
    assert!(!root.has_provider());
}

#[cfg(feature = "admin")]
mod admin {
    use super::*;
    use gantry::backoffice::{AdminLoader, BACKOFFICE_MODULE, BackofficeModule};
    use gantry_admin::AdapterRegistry;

    #[test]
    fn admin_feature_is_registered() {
        assert!(features::is_enabled("admin"));
        assert!(!features::is_enabled("billing"));
    }

    #[tokio::test]
    async fn root_imports_exactly_the_backoffice() -> Result<(), Box<dyn std::error::Error>> {
        let loader = AdminLoader::new(AdapterRegistry::new());
        let backoffice = BackofficeModule::for_root_with(&loader).await?;

        let root = AppModule::compose([backoffice.clone()]);
        assert_eq!(root.imported(), [backoffice]);
        Ok(())
    }

    #[tokio::test]
    async fn for_root_loads_the_backoffice() -> Result<(), Box<dyn std::error::Error>> {
        let root = AppModule::for_root().await?;

        assert_eq!(root.name(), APP_MODULE);
        let names = root.imported().iter().map(|m| m.name()).collect::<Vec<_>>();
        assert_eq!(names, [BACKOFFICE_MODULE]);
        assert_eq!(root.imported()[0].imported().len(), 1);
        Ok(())
    }
}
