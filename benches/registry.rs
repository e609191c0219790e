use context_registry::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

struct ElectricalInstallation;
struct WaterInstallation;
struct Family;

#[derive(Default)]
struct House {
    electrical: Option<Arc<ElectricalInstallation>>,
    water: Option<Arc<WaterInstallation>>,
    family: Option<Arc<Family>>,
}

impl Autowire for House {
    type Wiring = (Arc<ElectricalInstallation>, Arc<WaterInstallation>, Arc<Family>);

    fn resolve_wiring<C: Container + ?Sized>(c: &C) -> DiResult<Self::Wiring> {
        Ok((c.get()?, c.get()?, c.lookup("myFamily")?))
    }

    fn apply_wiring(&mut self, (electrical, water, family): Self::Wiring) {
        self.electrical = Some(electrical);
        self.water = Some(water);
        self.family = Some(family);
    }
}

fn house_module(services: &mut ServiceCollection) -> DiResult<()> {
    services.add_singleton(ElectricalInstallation);
    services.add_singleton_factory::<WaterInstallation, _>(|_| Ok(WaterInstallation));
    services.add_named_singleton("myFamily", Family);
    Ok(())
}

fn house_registry() -> ContainerRegistry {
    let mut catalog = ModuleCatalog::new();
    catalog.add_module("app.config", house_module);
    ContainerRegistry::new(catalog)
}

// ===== Micro Benchmarks =====

fn bench_container_hit(c: &mut Criterion) {
    let registry = house_registry();
    // Prime the container
    let _ = registry.get_container("app.config").unwrap();

    c.bench_function("registry_hit", |b| {
        b.iter(|| {
            let container = registry.get_container(black_box("app.config")).unwrap();
            black_box(container);
        })
    });
}

fn bench_container_cold(c: &mut Criterion) {
    c.bench_function("registry_cold", |b| {
        b.iter_batched(
            house_registry,
            |registry| {
                let container = registry.get_container("app.config").unwrap();
                black_box(container);
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_inject_into(c: &mut Criterion) {
    let registry = house_registry();
    let _ = registry.get_container("app.config").unwrap();

    c.bench_function("inject_into_house", |b| {
        b.iter(|| {
            let house = registry.inject_into(House::default(), "app.config").unwrap();
            black_box(house.family.is_some());
        })
    });
}

fn bench_identifier_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("identifier_scaling");

    for count in [1usize, 16, 256] {
        let mut catalog = ModuleCatalog::new();
        let identifiers: Vec<String> = (0..count).map(|i| format!("app.config.job{}", i)).collect();
        for identifier in &identifiers {
            catalog.add_module(identifier.clone(), house_module);
        }
        let registry = ContainerRegistry::new(catalog);
        for identifier in &identifiers {
            let _ = registry.get_container(identifier).unwrap();
        }

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            let mut next = 0;
            b.iter(|| {
                let container = registry.get_container(&identifiers[next % count]).unwrap();
                next += 1;
                black_box(container);
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_container_hit,
    bench_container_cold,
    bench_inject_into,
    bench_identifier_scaling
);
criterion_main!(benches);
