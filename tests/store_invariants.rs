use decocam::error::StoreError;
use decocam::store::{INDEX_FILE, OverlayStore};
use image::{Rgba, RgbaImage};

/// Distinct, valid PNG bytes per seed
fn png(seed: u8) -> Vec<u8> {
    let raster = RgbaImage::from_pixel(2, 2, Rgba([seed, seed.wrapping_add(1), 0, 255]));
    let mut bytes = Vec::new();
    raster
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn assert_selection_valid(store: &OverlayStore) {
    match store.selection() {
        None => {}
        Some(index) => assert!(index < store.len(), "selection {index} out of range"),
    }
}

#[test]
fn append_remove_select_keep_the_selection_valid() {
    let mut store = OverlayStore::ephemeral();

    let a = store.append(png(1)).unwrap();
    let b = store.append(png(2)).unwrap();
    let c = store.append(png(3)).unwrap();
    assert_selection_valid(&store);

    store.select(Some(1)).unwrap();
    assert_selection_valid(&store);

    // Removing an entry before the selection shifts it down so it still
    // points at the same overlay
    store.remove(a).unwrap();
    assert_eq!(store.selection(), Some(0));
    assert_eq!(store.selected().unwrap().id(), b);
    assert_selection_valid(&store);

    // Removing the selected entry clears the selection
    store.remove(b).unwrap();
    assert_eq!(store.selection(), None);
    assert_selection_valid(&store);

    // Removing an entry after the selection leaves it alone
    let d = store.append(png(4)).unwrap();
    store.select(Some(0)).unwrap();
    store.remove(d).unwrap();
    assert_eq!(store.selection(), Some(0));
    assert_eq!(store.selected().unwrap().id(), c);
    assert_selection_valid(&store);
}

#[test]
fn duplicate_appends_are_refused() {
    let mut store = OverlayStore::ephemeral();

    store.append(png(7)).unwrap();
    let result = store.append(png(7));

    assert!(matches!(result, Err(StoreError::AlreadyExists)));
    assert_eq!(store.len(), 1);
}

#[test]
fn out_of_range_selection_is_refused() {
    let mut store = OverlayStore::ephemeral();
    store.append(png(1)).unwrap();

    assert!(matches!(
        store.select(Some(1)),
        Err(StoreError::InvalidSelection { index: 1, len: 1 })
    ));
    assert_eq!(store.selection(), None);

    store.select(Some(0)).unwrap();
    store.select(None).unwrap();
    assert_eq!(store.selection(), None);
}

#[test]
fn removing_an_unknown_id_fails_cleanly() {
    let mut store = OverlayStore::ephemeral();
    store.append(png(1)).unwrap();

    let unknown = uuid::Uuid::new_v4();
    assert!(matches!(
        store.remove(unknown),
        Err(StoreError::UnknownId(_))
    ));
    assert_eq!(store.len(), 1);
}

#[test]
fn store_round_trips_through_disk() {
    let root = std::env::temp_dir().join(format!("decocam-store-{}", uuid::Uuid::new_v4()));

    let (a, b) = {
        let mut store = OverlayStore::load(root.clone()).unwrap();
        assert!(store.is_empty());
        let a = store.append(png(10)).unwrap();
        let b = store.append(png(11)).unwrap();
        store.select(Some(1)).unwrap();
        (a, b)
    };

    assert!(root.join(INDEX_FILE).exists());

    let reloaded = OverlayStore::load(root.clone()).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.entries()[0].id(), a);
    assert_eq!(reloaded.entries()[1].id(), b);
    assert_eq!(reloaded.entries()[0].png(), png(10));
    // The selection is transient, not persisted
    assert_eq!(reloaded.selection(), None);

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn missing_blobs_are_dropped_at_load() {
    let root = std::env::temp_dir().join(format!("decocam-store-{}", uuid::Uuid::new_v4()));

    let keep = {
        let mut store = OverlayStore::load(root.clone()).unwrap();
        let gone = store.append(png(20)).unwrap();
        let keep = store.append(png(21)).unwrap();

        // Simulate a blob vanishing behind the store's back
        std::fs::remove_file(root.join(format!("{gone}.png"))).unwrap();
        keep
    };

    let reloaded = OverlayStore::load(root.clone()).unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.entries()[0].id(), keep);

    std::fs::remove_dir_all(&root).unwrap();
}
