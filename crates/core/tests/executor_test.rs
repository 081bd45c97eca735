//! Tests for nested programs: form XObjects and tiling pattern cells.

use std::sync::Arc;

use bytes::Bytes;
use pagemark_core::config::{InterpreterConfig, TileCacheKey};
use pagemark_core::interp::{Interpreter, MarkupHandler, PaintEvent, PaintRecord, TraceHandler};
use pagemark_core::model::{ColorSpace, GState, Path, TileImage, TileSurface};
use pagemark_core::resources::{FormXObject, Image, PaintType, ResourceMap, TilingPattern};
use pagemark_core::utils::{MATRIX_IDENTITY, Matrix, Rect};

fn run_with_config(
    content: &[u8],
    resources: ResourceMap,
    config: InterpreterConfig,
) -> Vec<PaintEvent> {
    let mut handler = TraceHandler::new();
    Interpreter::with_config(&mut handler, Arc::new(resources), config)
        .execute(&Bytes::copy_from_slice(content))
        .expect("program should run");
    handler.into_events()
}

fn run(content: &[u8], resources: ResourceMap) -> Vec<PaintEvent> {
    run_with_config(content, resources, InterpreterConfig::default())
}

fn fills(events: &[PaintEvent]) -> Vec<&PaintEvent> {
    events
        .iter()
        .filter(|e| matches!(e, PaintEvent::Fill { .. }))
        .collect()
}

fn image(width: u32) -> Image {
    Image {
        width,
        height: 1,
        bits_per_component: 8,
        color_space: Some(ColorSpace::device_gray()),
        image_mask: false,
        filters: Vec::new(),
        data: Bytes::new(),
        inline: false,
    }
}

// ============================================================================
// Form XObjects
// ============================================================================

#[test]
fn test_form_runs_under_matrix_and_bbox_clip() {
    let form = FormXObject::new(1, (0.0, 0.0, 50.0, 50.0), &b"0 0 10 10 re f"[..])
        .with_matrix((1.0, 0.0, 0.0, 1.0, 100.0, 100.0));
    let events = run(b"/Fm0 Do", ResourceMap::new().with_form("Fm0", form));

    assert_eq!(events.len(), 4);
    assert_eq!(events[0], PaintEvent::Save);
    assert_eq!(
        events[1],
        PaintEvent::Clip {
            path: Path::from_rect(100.0, 100.0, 50.0, 50.0),
            even_odd: false,
        }
    );
    let PaintEvent::Fill { ctm, .. } = &events[2] else {
        panic!("expected fill, got {:?}", events[2]);
    };
    assert_eq!(*ctm, (1.0, 0.0, 0.0, 1.0, 100.0, 100.0));
    assert_eq!(events[3], PaintEvent::Restore);
}

#[test]
fn test_form_state_is_restored() {
    // The form leaves two states pushed and changes the color
    let form = FormXObject::new(1, (0.0, 0.0, 10.0, 10.0), &b"q q 0.5 g 2 0 0 2 0 0 cm"[..]);
    let mut handler = TraceHandler::new();
    let mut interp = Interpreter::new(
        &mut handler,
        Arc::new(ResourceMap::new().with_form("Fm0", form)),
    );
    let before = interp.gstate().clone();
    interp.execute(&Bytes::from_static(b"/Fm0 Do")).unwrap();
    assert_eq!(interp.gstate(), &before);
    assert_eq!(interp.gstate_depth(), 1);

    let saves = handler.count(|e| *e == PaintEvent::Save);
    let restores = handler.count(|e| *e == PaintEvent::Restore);
    assert_eq!((saves, restores), (3, 3));
}

#[test]
fn test_form_cannot_pop_caller_state() {
    let form = FormXObject::new(1, (0.0, 0.0, 10.0, 10.0), &b"Q Q"[..]);
    let mut handler = TraceHandler::new();
    let mut interp = Interpreter::new(
        &mut handler,
        Arc::new(ResourceMap::new().with_form("Fm0", form)),
    );
    interp
        .execute(&Bytes::from_static(b"q 3 w /Fm0 Do Q"))
        .unwrap();
    assert_eq!(interp.gstate_depth(), 1);
    assert_eq!(interp.gstate().line_width(), 1.0);
}

#[test]
fn test_form_error_is_contained() {
    let form = FormXObject::new(1, (0.0, 0.0, 10.0, 10.0), &b"0 0 1 1 re f 1 re f"[..]);
    let events = run(
        b"/Fm0 Do 0 0 5 5 re f",
        ResourceMap::new().with_form("Fm0", form),
    );
    // One fill from the form before its error, one from the page after it
    assert_eq!(fills(&events).len(), 2);
    assert_eq!(events.iter().filter(|e| **e == PaintEvent::Restore).count(), 1);
}

#[test]
fn test_recursive_form_is_skipped() {
    let form = FormXObject::new(7, (0.0, 0.0, 10.0, 10.0), &b"0 0 1 1 re f /Fm0 Do"[..]);
    let events = run(b"/Fm0 Do", ResourceMap::new().with_form("Fm0", form));
    assert_eq!(fills(&events).len(), 1);
}

#[test]
fn test_nesting_limit() {
    let resources = ResourceMap::new()
        .with_form("Fm0", FormXObject::new(1, (0.0, 0.0, 9.0, 9.0), &b"/Fm1 Do"[..]))
        .with_form(
            "Fm1",
            FormXObject::new(2, (0.0, 0.0, 9.0, 9.0), &b"/Fm2 Do 0 0 1 1 re f"[..]),
        )
        .with_form("Fm2", FormXObject::new(3, (0.0, 0.0, 9.0, 9.0), &b"0 0 2 2 re f"[..]));

    let limited = run_with_config(
        b"/Fm0 Do",
        resources.clone(),
        InterpreterConfig::default().with_max_nesting_depth(2),
    );
    assert_eq!(fills(&limited).len(), 1);

    let unlimited = run(b"/Fm0 Do", resources);
    assert_eq!(fills(&unlimited).len(), 2);
}

#[test]
fn test_form_resources_shadow_page_resources() {
    let inner = ResourceMap::new().with_image("Im0", image(3));
    let form = FormXObject::new(1, (0.0, 0.0, 10.0, 10.0), &b"/Im0 Do /Im1 Do"[..])
        .with_resources(Arc::new(inner));
    let resources = ResourceMap::new()
        .with_image("Im0", image(2))
        .with_image("Im1", image(5))
        .with_form("Fm0", form);

    let events = run(b"/Im0 Do /Fm0 Do /Im0 Do", resources);
    let widths: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            PaintEvent::Image { width, .. } => Some(*width),
            _ => None,
        })
        .collect();
    assert_eq!(widths, vec![2, 3, 5, 2]);
}

// ============================================================================
// Tiling patterns
// ============================================================================

/// Records the tile behind every fill so sharing can be checked.
#[derive(Default)]
struct TileRecorder {
    tiles_begun: usize,
    fills: Vec<Option<Arc<TileImage>>>,
    tile_fills: Vec<PaintRecord>,
    in_tile: bool,
}

impl MarkupHandler for TileRecorder {
    fn fill_path(&mut self, gstate: &GState, _path: &Path) {
        if self.in_tile {
            self.tile_fills.push(PaintRecord::from(&gstate.fill));
        } else {
            self.fills.push(gstate.fill.tile().cloned());
        }
    }

    fn begin_tile(&mut self, _cell: Rect, _matrix: Matrix) {
        self.tiles_begun += 1;
        self.in_tile = true;
    }

    fn end_tile(&mut self) -> Option<TileSurface> {
        self.in_tile = false;
        Some(Arc::new(self.tiles_begun))
    }
}

fn colored_pattern() -> TilingPattern {
    TilingPattern::new(
        9,
        PaintType::Colored,
        (0.0, 0.0, 10.0, 10.0),
        &b"1 0 0 rg 0 0 5 5 re f"[..],
    )
}

#[test]
fn test_tile_rendered_once_and_shared() {
    let resources = ResourceMap::new().with_tiling_pattern("P0", colored_pattern());
    let mut recorder = TileRecorder::default();
    let mut interp = Interpreter::new(&mut recorder, Arc::new(resources));
    interp
        .execute(&Bytes::from_static(
            b"/Pattern cs /P0 scn 0 0 100 100 re f /P0 scn 0 0 50 50 re f /P0 scn 10 10 5 5 re f",
        ))
        .unwrap();
    assert_eq!(interp.cached_tiles(), 1);

    assert_eq!(recorder.tiles_begun, 1);
    assert_eq!(recorder.tile_fills.len(), 1);
    assert_eq!(recorder.fills.len(), 3);
    let tiles: Vec<Arc<TileImage>> = recorder.fills.iter().flatten().cloned().collect();
    assert_eq!(tiles.len(), 3);
    assert!(Arc::ptr_eq(&tiles[0], &tiles[1]));
    assert!(Arc::ptr_eq(&tiles[0], &tiles[2]));
    assert_eq!(tiles[0].pattern_id, 9);
    assert_eq!(tiles[0].xstep, 10.0);
    assert!(tiles[0].surface.is_some());
}

#[test]
fn test_tile_events_and_cell_origin() {
    let pattern = TilingPattern::new(
        3,
        PaintType::Colored,
        (20.0, 30.0, 40.0, 50.0),
        &b"20 30 5 5 re f"[..],
    );
    let events = run(
        b"/Pattern cs /P0 scn 0 0 1 1 re f",
        ResourceMap::new().with_tiling_pattern("P0", pattern),
    );
    assert_eq!(
        events[0],
        PaintEvent::BeginTile {
            cell: (20.0, 30.0, 40.0, 50.0),
            matrix: MATRIX_IDENTITY,
        }
    );
    // Cell content is drawn relative to the cell's lower-left corner
    let PaintEvent::Fill { ctm, .. } = &events[1] else {
        panic!("expected tile fill");
    };
    assert_eq!(*ctm, (1.0, 0.0, 0.0, 1.0, -20.0, -30.0));
    assert_eq!(events[2], PaintEvent::EndTile);
    let PaintEvent::Fill { paint, ctm, .. } = &events[3] else {
        panic!("expected page fill");
    };
    assert_eq!(*ctm, MATRIX_IDENTITY);
    assert_eq!(
        paint,
        &PaintRecord::Tiling {
            pattern_id: 3,
            tint: None
        }
    );
}

fn uncolored_resources() -> ResourceMap {
    let pattern = TilingPattern::new(
        4,
        PaintType::Uncolored,
        (0.0, 0.0, 8.0, 8.0),
        &b"0 0 8 8 re f"[..],
    );
    ResourceMap::new()
        .with_tiling_pattern("P1", pattern)
        .with_color_space("Cs1", ColorSpace::pattern_with_base(ColorSpace::device_rgb()))
}

const UNCOLORED_PROGRAM: &[u8] =
    b"/Cs1 cs 1 0 0 /P1 scn 0 0 1 1 re f 0 1 0 /P1 scn 0 0 1 1 re f 1 0 0 /P1 scn 0 0 1 1 re f";

#[test]
fn test_uncolored_tile_keyed_by_tint() {
    let mut recorder = TileRecorder::default();
    let mut interp = Interpreter::new(&mut recorder, Arc::new(uncolored_resources()));
    interp
        .execute(&Bytes::from_static(UNCOLORED_PROGRAM))
        .unwrap();
    assert_eq!(interp.cached_tiles(), 2);
    assert_eq!(recorder.tiles_begun, 2);
    // Tile content paints in the tint
    assert_eq!(
        recorder.tile_fills,
        vec![
            PaintRecord::Solid {
                components: vec![1.0, 0.0, 0.0]
            },
            PaintRecord::Solid {
                components: vec![0.0, 1.0, 0.0]
            },
        ]
    );
    let tiles: Vec<Arc<TileImage>> = recorder.fills.iter().flatten().cloned().collect();
    assert!(Arc::ptr_eq(&tiles[0], &tiles[2]));
    assert!(!Arc::ptr_eq(&tiles[0], &tiles[1]));
}

#[test]
fn test_uncolored_tile_keyed_by_pattern_only() {
    let config = InterpreterConfig::default().with_tile_cache_key(TileCacheKey::PatternOnly);
    let mut recorder = TileRecorder::default();
    let mut interp =
        Interpreter::with_config(&mut recorder, Arc::new(uncolored_resources()), config);
    interp
        .execute(&Bytes::from_static(UNCOLORED_PROGRAM))
        .unwrap();
    assert_eq!(interp.cached_tiles(), 1);
    assert_eq!(recorder.tiles_begun, 1);
}

#[test]
fn test_uncolored_tint_recorded_in_paint() {
    let events = run(b"/Cs1 cs 0 0 1 /P1 scn 0 0 1 1 re f", uncolored_resources());
    let PaintEvent::Fill { paint, .. } = events.last().unwrap() else {
        panic!("expected fill");
    };
    assert_eq!(
        paint,
        &PaintRecord::Tiling {
            pattern_id: 4,
            tint: Some(vec![0.0, 0.0, 1.0]),
        }
    );
}

#[test]
fn test_tile_error_is_contained_and_cached() {
    let pattern = TilingPattern::new(5, PaintType::Colored, (0.0, 0.0, 4.0, 4.0), &b"1 re f"[..]);
    let resources = ResourceMap::new().with_tiling_pattern("P0", pattern);
    let mut handler = TraceHandler::new();
    let mut interp = Interpreter::new(&mut handler, Arc::new(resources));
    let before = interp.gstate().ctm;
    interp
        .execute(&Bytes::from_static(b"/Pattern cs /P0 scn /P0 scn 0 0 1 1 re f"))
        .unwrap();
    assert_eq!(interp.cached_tiles(), 1);
    assert_eq!(interp.gstate().ctm, before);

    assert_eq!(handler.count(|e| matches!(e, PaintEvent::BeginTile { .. })), 1);
    assert_eq!(handler.count(|e| *e == PaintEvent::EndTile), 1);
    assert_eq!(handler.count(|e| matches!(e, PaintEvent::Fill { .. })), 1);
}

#[test]
fn test_tile_unbalanced_save_is_restored() {
    let pattern = TilingPattern::new(
        6,
        PaintType::Colored,
        (0.0, 0.0, 10.0, 10.0),
        &b"q q 0 0 5 5 re f"[..],
    );
    let resources = ResourceMap::new().with_tiling_pattern("P0", pattern);
    let mut handler = TraceHandler::new();
    let mut interp = Interpreter::new(&mut handler, Arc::new(resources));
    interp
        .execute(&Bytes::from_static(b"/Pattern cs /P0 scn 0 0 10 10 re f"))
        .unwrap();
    assert_eq!(interp.gstate_depth(), 1);

    assert_eq!(handler.count(|e| *e == PaintEvent::Save), 2);
    assert_eq!(handler.count(|e| *e == PaintEvent::Restore), 2);
    // Restores come before the tile is finished
    let end = handler.events().iter().position(|e| *e == PaintEvent::EndTile);
    let last_restore = handler.events().iter().rposition(|e| *e == PaintEvent::Restore);
    assert!(last_restore < end);
}
