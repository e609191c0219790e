/// Configuration property tests
///
/// Environment-mutating tests run serially.

use context_registry::config::{
    ConfigContainerExt, ConfigValue, EnvironmentPropertySource, JsonPropertySource,
    PropertiesModule, PropertySource,
};
use context_registry::{
    Autowire, Container, ContainerRegistry, DiError, DiResult, ModuleCatalog, ServiceCollection,
    ServiceCollectionExt,
};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Sink {
    endpoint: Option<Arc<ConfigValue>>,
    flush_interval: Option<Duration>,
}

impl Autowire for Sink {
    type Wiring = (Arc<ConfigValue>, Duration);

    fn resolve_wiring<C: Container + ?Sized>(container: &C) -> DiResult<Self::Wiring> {
        let endpoint = container.property("sink.endpoint")?;
        let flush = container.property("sink.flush.ms")?.as_duration_ms()?;
        Ok((endpoint, flush))
    }

    fn apply_wiring(&mut self, (endpoint, flush): Self::Wiring) {
        self.endpoint = Some(endpoint);
        self.flush_interval = Some(flush);
    }
}

const SINK_JSON: &str = r#"{"sink": {"endpoint": "kafka://broker:9092", "flush": {"ms": 500}}}"#;

#[test]
fn test_json_properties_are_injected() {
    let mut catalog = ModuleCatalog::new();
    catalog.add_module(
        "jobs.sink",
        PropertiesModule::new().with_source(JsonPropertySource::from_json(SINK_JSON).unwrap()),
    );
    let registry = ContainerRegistry::new(catalog);

    let sink = registry.inject_into(Sink::default(), "jobs.sink").unwrap();
    assert_eq!(sink.endpoint.unwrap().as_str().unwrap(), "kafka://broker:9092");
    assert_eq!(sink.flush_interval, Some(Duration::from_millis(500)));
}

#[test]
fn test_properties_feed_factories() {
    struct Broker {
        address: String,
    }

    let mut catalog = ModuleCatalog::new();
    catalog
        .add_module(
            "jobs.sink",
            PropertiesModule::new().with_source(JsonPropertySource::from_json(SINK_JSON).unwrap()),
        )
        .add_module("jobs.sink.broker", |services: &mut ServiceCollection| -> DiResult<()> {
            services.add_singleton_factory::<Broker, _>(|c| {
                Ok(Broker {
                    address: c.property("sink.endpoint")?.as_str()?.to_string(),
                })
            });
            Ok(())
        });
    let registry = ContainerRegistry::new(catalog);

    let container = registry.get_container("jobs.sink").unwrap();
    assert_eq!(container.get::<Broker>().unwrap().address, "kafka://broker:9092");
}

#[test]
fn test_wrong_property_shape_is_an_injection_error() {
    let module = PropertiesModule::new()
        .with_source(JsonPropertySource::from_json(r#"{"sink": {"endpoint": 1, "flush": {"ms": "soon"}}}"#).unwrap());
    let mut catalog = ModuleCatalog::new();
    catalog.add_module("jobs.sink", module);
    let registry = ContainerRegistry::new(catalog);

    let err = registry.inject_into(Sink::default(), "jobs.sink").err().unwrap();
    assert!(matches!(err.di_error(), DiError::TypeMismatch(_)));
}

#[test]
fn test_json_file_source() {
    let path = std::env::temp_dir().join(format!("context-registry-{}.json", std::process::id()));
    std::fs::write(&path, SINK_JSON).unwrap();

    let source = JsonPropertySource::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(source.get("sink.flush.ms"), Some(ConfigValue::Integer(500)));
    assert!(matches!(
        JsonPropertySource::from_path(&path),
        Err(DiError::Configuration(_))
    ));
}

#[test]
#[serial]
fn test_environment_source() {
    std::env::set_var("CTXREG_TEST_SINK_ENDPOINT", "kafka://env:9092");
    std::env::set_var("CTXREG_TEST_PARALLELISM", "4");

    let source = EnvironmentPropertySource::with_prefix("ctxreg_test");
    assert_eq!(
        source.get("sink.endpoint"),
        Some(ConfigValue::String("kafka://env:9092".to_string()))
    );
    assert_eq!(source.get("parallelism"), Some(ConfigValue::Integer(4)));
    assert_eq!(source.keys(), vec!["parallelism".to_string(), "sink.endpoint".to_string()]);

    std::env::remove_var("CTXREG_TEST_SINK_ENDPOINT");
    std::env::remove_var("CTXREG_TEST_PARALLELISM");
    assert_eq!(source.get("parallelism"), None);
}

#[test]
#[serial]
fn test_earlier_source_wins() {
    std::env::set_var("CTXREG_PRIO_SINK_ENDPOINT", "kafka://override:9092");

    let module = PropertiesModule::new()
        .with_source(EnvironmentPropertySource::with_prefix("CTXREG_PRIO"))
        .with_source(JsonPropertySource::from_json(SINK_JSON).unwrap());
    let container = ServiceCollection::new()
        .add_module(&module)
        .unwrap()
        .build();

    std::env::remove_var("CTXREG_PRIO_SINK_ENDPOINT");

    assert_eq!(
        container.property("sink.endpoint").unwrap().as_str().unwrap(),
        "kafka://override:9092"
    );
    assert_eq!(container.property("sink.flush.ms").unwrap().as_i64().unwrap(), 500);
}
