#![allow(dead_code)]

use catalog_manifest_core::Config;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const BRAND_CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog xmlns="http://www.demandware.com/xml/impex/catalog/2006-10-31" catalog-id="brand">
    <product product-id="ABC123">
        <images>
            <image-group view-type="hi-res">
                <image path="gray/ABC123_instepprofile_large.jpg"/>
                <image path="default/ABC123_9_regular.jpg"/>
            </image-group>
            <image-group view-type="thumbnail">
                <image path="default/ABC123_3_thumbnail.jpg"/>
            </image-group>
            <image-group view-type="grid-large">
                <image path="spins/ABC123_thumbnail.jpg"/>
            </image-group>
        </images>
    </product>
    <product product-id="DEF456">
        <images>
            <image-group view-type="hi-res">
                <image path="default/DEF456_large.jpg"/>
                <image path="/default/DEF456_regular.jpg"/>
            </image-group>
        </images>
    </product>
    <product product-id="GHI789">
        <images>
            <image-group view-type="hi-res">
                <image path="default/GHI789_large.jpg"/>
            </image-group>
        </images>
    </product>
    <product product-id="NOTLISTED">
        <images>
            <image-group view-type="hi-res">
                <image path="default/NOTLISTED_large.jpg"/>
            </image-group>
        </images>
    </product>
</catalog>
"#;

pub const ORPHAN_CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog catalog-id="orphan">
    <product product-id="ORPHAN1">
        <images>
            <image-group view-type="hi-res">
                <image path="default/ORPHAN1_large.jpg"/>
            </image-group>
        </images>
    </product>
</catalog>
"#;

/// Write a file, creating parent directories as needed
pub fn write_file(path: &Path, contents: &[u8]) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut file = File::create(path).unwrap();
    file.write_all(contents).unwrap();
    path.to_path_buf()
}

/// Write a real JPEG with the given dimensions
pub fn write_jpeg(path: &Path, width: u32, height: u32) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::new(width, height).save(path).unwrap();
    path.to_path_buf()
}

/// Create a complete export layout: two catalogs (one without an
/// allow-list), allow-lists, an image store and a Shopify style map
pub fn setup_export_tree() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write_file(&root.join("catalogs/brand_catalog.xml"), BRAND_CATALOG.as_bytes());
    write_file(&root.join("catalogs/orphan_catalog.xml"), ORPHAN_CATALOG.as_bytes());
    write_file(&root.join("catalogs/notes.txt"), b"not a catalog");

    write_file(
        &root.join("styles/brand_styles.txt"),
        b"ABC123\nDEF456\n\nGHI789\n",
    );

    let images = root.join("images/images");
    write_jpeg(&images.join("gray/ABC123_instepprofile_large.jpg"), 800, 600);
    write_file(&images.join("default/ABC123_9_regular.jpg"), b"NOT A JPEG");
    write_file(&images.join("default/ABC123_3_thumbnail.jpg"), b"NOT A JPEG");
    write_file(&images.join("spins/ABC123_thumbnail.jpg"), b"SPIN FRAME");
    write_file(&images.join("default/DEF456_large.jpg"), b"FIRST DEF456");
    write_file(&images.join("default/DEF456_regular.jpg"), b"SECOND DEF456");
    write_file(&images.join("default/ORPHAN1_large.jpg"), b"ORPHAN");

    write_file(
        &root.join("shopify-styles/brand_styles.csv"),
        b"id,title,style\n7001,Trail Runner,ABC123\n",
    );

    dir
}

/// Configuration rooted at a test export tree
pub fn test_config(root: &Path) -> Config {
    Config {
        root: root.to_path_buf(),
        threads: 2,
        dimension_timeout_secs: 5,
        ..Default::default()
    }
}
