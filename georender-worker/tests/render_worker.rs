use futures::executor::block_on;
use georender_worker::{
    EngineError, Gcp, GeoreferencedMap, OffscreenSurface, Point, RenderConfig, RenderEngine,
    RenderWorker, ResourceImage, SessionError, TileCache, Viewport,
};
use std::thread;

const GREEN: [u8; 4] = [0, 200, 0, 255];

/// 32x32 solid map covering lon/lat [-0.05, 0.05] around the origin
fn map_around_origin(id: &str) -> GeoreferencedMap {
    GeoreferencedMap {
        id: id.to_string(),
        resource: ResourceImage {
            width: 32,
            height: 32,
            pixels: GREEN.repeat(32 * 32),
        },
        gcps: vec![
            Gcp {
                resource: Point::new(0.0, 0.0),
                geo: Point::new(-0.05, 0.05),
            },
            Gcp {
                resource: Point::new(32.0, 0.0),
                geo: Point::new(0.05, 0.05),
            },
            Gcp {
                resource: Point::new(32.0, 32.0),
                geo: Point::new(0.05, -0.05),
            },
            Gcp {
                resource: Point::new(0.0, 32.0),
                geo: Point::new(-0.05, -0.05),
            },
        ],
        resource_mask: Vec::new(),
    }
}

#[test]
fn render_before_initialize_is_rejected() {
    let worker = RenderWorker::spawn(RenderConfig::default()).unwrap();
    let result = block_on(worker.render(Point::new(0.0, 0.0), 256, 256, 1000.0));
    assert_eq!(result, Err(SessionError::NotInitialized));

    let result = block_on(worker.add_georeferenced_map(map_around_origin("a")));
    assert_eq!(result, Err(SessionError::NotInitialized));
}

#[test]
fn render_returns_full_rgba_buffer() {
    let worker = RenderWorker::spawn(RenderConfig::default()).unwrap();
    block_on(worker.initialize(256, 256)).unwrap();

    let image = block_on(worker.render(Point::new(0.0, 0.0), 256, 256, 1000.0)).unwrap();
    assert_eq!(image.width(), 256);
    assert_eq!(image.height(), 256);
    assert_eq!(image.into_vec().len(), 256 * 256 * 4);
}

#[test]
fn rendered_map_is_visible_in_buffer() {
    let worker = RenderWorker::spawn(RenderConfig::default()).unwrap();
    block_on(worker.initialize(64, 64)).unwrap();
    block_on(worker.add_georeferenced_map(map_around_origin("a"))).unwrap();

    // 1 km around the origin lies well inside the map
    let image = block_on(worker.render(Point::new(0.0, 0.0), 64, 64, 1000.0)).unwrap();
    assert_eq!(image.pixel(0, 0), GREEN);
    assert_eq!(image.pixel(32, 32), GREEN);

    // Far away from the map nothing is drawn
    let image = block_on(worker.render(Point::new(20.0, 20.0), 64, 64, 1000.0)).unwrap();
    assert!(image.data().iter().all(|b| *b == 0));
}

#[test]
fn buffer_covers_the_whole_query_region() {
    let worker = RenderWorker::spawn(RenderConfig::default()).unwrap();
    block_on(worker.initialize(64, 64)).unwrap();

    // Only the western half of the map, west of lon 0, is drawable
    let mut map = map_around_origin("west");
    map.resource_mask = vec![
        Point::new(0.0, 0.0),
        Point::new(16.0, 0.0),
        Point::new(16.0, 32.0),
        Point::new(0.0, 32.0),
    ];
    block_on(worker.add_georeferenced_map(map)).unwrap();

    let image = block_on(worker.render(Point::new(0.0, 0.0), 64, 64, 1000.0)).unwrap();
    assert_eq!(image.data().len(), 64 * 64 * 4);
    assert_eq!(image.pixel(0, 32), GREEN);
    assert_eq!(image.pixel(63, 32), [0, 0, 0, 0]);
}

#[test]
fn render_size_may_differ_from_initial_surface() {
    let worker = RenderWorker::spawn(RenderConfig::default()).unwrap();
    block_on(worker.initialize(16, 16)).unwrap();

    let image = block_on(worker.render(Point::new(0.0, 0.0), 40, 30, 500.0)).unwrap();
    assert_eq!(image.data().len(), 40 * 30 * 4);
}

#[test]
fn invalid_map_error_reaches_caller() {
    let worker = RenderWorker::spawn(RenderConfig::default()).unwrap();
    block_on(worker.initialize(16, 16)).unwrap();

    let mut map = map_around_origin("broken");
    map.gcps.truncate(1);
    let result = block_on(worker.add_georeferenced_map(map));
    assert!(matches!(
        result,
        Err(SessionError::Engine(EngineError::InvalidMap { .. }))
    ));
}

#[test]
fn handles_from_many_threads_share_one_session() {
    let worker = RenderWorker::spawn(RenderConfig::default()).unwrap();
    block_on(worker.initialize(32, 32)).unwrap();
    block_on(worker.add_georeferenced_map(map_around_origin("a"))).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let worker = worker.clone();
            thread::spawn(move || {
                let size = 16 + i * 8;
                let image =
                    block_on(worker.render(Point::new(0.0, 0.0), size, size, 800.0)).unwrap();
                (size, image)
            })
        })
        .collect();

    for handle in handles {
        let (size, image) = handle.join().unwrap();
        assert_eq!(image.width(), size);
        assert_eq!(image.data().len(), (size * size * 4) as usize);
        assert_eq!(image.pixel(size / 2, size / 2), GREEN);
    }
}

/// Engine whose render panics, taking the worker thread down
struct PanickingEngine {
    surface: OffscreenSurface,
    tile_cache: TileCache,
}

impl RenderEngine for PanickingEngine {
    fn with_surface(surface: OffscreenSurface, _config: &RenderConfig) -> Self {
        Self {
            surface,
            tile_cache: TileCache::new(),
        }
    }

    async fn add_georeferenced_map(&mut self, _map: GeoreferencedMap) -> Result<(), EngineError> {
        Ok(())
    }

    fn tile_cache(&self) -> &TileCache {
        &self.tile_cache
    }

    fn tile_cache_mut(&mut self) -> &mut TileCache {
        &mut self.tile_cache
    }

    async fn render(&mut self, _viewport: &Viewport) -> Result<(), EngineError> {
        panic!("engine crashed");
    }

    fn surface_mut(&mut self) -> &mut OffscreenSurface {
        &mut self.surface
    }
}

#[test]
fn dead_worker_reports_disconnect() {
    let worker = RenderWorker::spawn_with_engine::<PanickingEngine>(RenderConfig::default()).unwrap();
    block_on(worker.initialize(8, 8)).unwrap();

    let result = block_on(worker.render(Point::new(0.0, 0.0), 8, 8, 10.0));
    assert_eq!(result, Err(SessionError::WorkerDisconnected));

    let result = block_on(worker.initialize(8, 8));
    assert_eq!(result, Err(SessionError::WorkerDisconnected));
}
