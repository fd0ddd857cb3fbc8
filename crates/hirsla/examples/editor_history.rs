//! Editor History — voxel edits with observation and undo/redo.
//!
//! Builds a small voxel store, paints a few voxels, recolors and erases one,
//! then walks the undo/redo history while observers report what changed.
//!
//! Run with: `RUST_LOG=debug cargo run -p hirsla --example editor_history`

use std::cell::Cell;
use std::rc::Rc;

use hirsla::prelude::*;

fn main() -> Result<(), StoreError> {
    env_logger::init();

    let store = Store::builder()
        .component("position", Schema::VEC3)
        .component("color", Schema::VEC4)
        .component("selected", Schema::Bool)
        .archetype("voxel", &["position", "color"])
        .resource("brush_color", Schema::VEC4, [1.0f32, 0.0, 0.0, 1.0])
        .build()?;
    let mut store = ObservableStore::new(store);
    let mut history = History::new();

    let redraws = Rc::new(Cell::new(0));
    let r = redraws.clone();
    let voxel = store.archetype_named("voxel").ok_or_else(|| {
        StoreError::UnknownArchetypeName("voxel".into())
    })?;
    let _redraw = store.observe_archetype(voxel, move || r.set(r.get() + 1))?;
    let _brush = store.observe_resource("brush_color", |color| {
        log::info!("brush color is now {color:?}");
    })?;
    let _log = store.observe_transactions(|result| {
        log::info!(
            "transaction touched {} entities in {} archetypes",
            result.changed_entities().len(),
            result.changed_archetypes().len()
        );
    });

    // Paint a row of voxels with the current brush.
    let brush = store.resource("brush_color").cloned().unwrap_or(Value::Null);
    let (painted, result) = store.execute(|tx| {
        (0..4)
            .map(|x| {
                tx.insert(
                    voxel,
                    values! { "position" => [x as f32, 0.0, 0.0], "color" => brush.clone() },
                )
            })
            .collect::<Result<Vec<_>, _>>()
    })?;
    history.record(&result);

    store.set_resource("brush_color", [0.0f32, 0.0, 1.0, 1.0])?;

    // Select and recolor one voxel (moves it to the `selected` archetype).
    let target = painted[1];
    let (_, result) = store.execute(|tx| {
        tx.update(
            target,
            EntityUpdate::new()
                .set("selected", true)
                .set("color", [0.0f32, 0.0, 1.0, 1.0]),
        )
    })?;
    history.record(&result);

    let (_, result) = store.execute(|tx| tx.delete(painted[3]))?;
    history.record(&result);

    print_voxels(&store);

    while history.undo(&mut store)? {
        println!("-- undo ({} left)", history.undo_count());
        print_voxels(&store);
    }
    while history.redo(&mut store)? {
        println!("-- redo ({} left)", history.redo_count());
    }
    print_voxels(&store);

    println!("voxel archetype redrawn {} times", redraws.get());

    #[cfg(feature = "diagnostics")]
    if let Ok(json) = store.stats().to_json() {
        println!("{json}");
    }

    Ok(())
}

fn print_voxels(store: &Store) {
    for archetype in store.query_archetypes(&["position", "color"], &[]) {
        let Some((positions, stride)) = archetype
            .column("position")
            .and_then(|c| c.as_vector_slice())
        else {
            continue;
        };
        let selected = archetype.has_component("selected");
        for (entity, position) in archetype.entities().iter().zip(positions.chunks(stride)) {
            println!(
                "  {entity} at {position:?}{}",
                if selected { " (selected)" } else { "" }
            );
        }
    }
}
