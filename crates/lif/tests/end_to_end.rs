mod common;

use common::container_with_json;
use glam::{Quat, Vec2, Vec3};
use lif::convergence::{self, Frustum, FrustumCamera};
use lif::{BlobRef, CameraInput, Convergence, LifDocument, LifError, LoadOptions, RenderCamera};
use serde_json::json;

#[test]
fn minimal_current_container_loads() {
    let meta = json!({
        "views": [{
            "image": {"blob_id": -1},
            "width_px": 100,
            "height_px": 50,
            "focal_px": 120,
            "inv_z_map": {"blob_id": 9, "min": 0.01, "max": 0.05},
            "layers_top_to_bottom": [{
                "image": {"blob_id": -1},
                "inv_z_map": {"blob_id": 9, "min": 0.01, "max": 0.05}
            }]
        }]
    });
    let bytes = container_with_json(&meta, &[(9, vec![0x7F; 100 * 50])]);
    let doc = LifDocument::from_bytes(bytes, &LoadOptions::default()).unwrap();

    assert_eq!(doc.scene.views.len(), 1);
    let view = &doc.scene.views[0];
    assert_eq!(view.width_px, 100);
    assert_eq!(view.height_px, 50);
    assert_eq!(view.focal_px, 120.0);
    assert_eq!(view.layers.len(), 1);
    assert_eq!(view.layers[0].width_px, 100);
    assert_eq!(view.layers[0].focal_px, 120.0);

    let depth = doc.blob(view.layers[0].inv_z_map.blob).unwrap();
    assert_eq!(depth.len(), 100 * 50);
    doc.check_blobs().unwrap();
}

#[test]
fn sentinel_resolves_to_whole_file() {
    let meta = json!({"views": [{
        "image": {"blob_id": -1}, "width": 8, "height": 8, "f": 8,
        "inv_z_map": {"blob_id": 9, "min": 0.1, "max": 0.2}
    }]});
    let bytes = container_with_json(&meta, &[(9, vec![1, 2, 3])]);
    let doc = LifDocument::from_bytes(bytes.clone(), &LoadOptions::default()).unwrap();

    assert_eq!(&doc.blob(BlobRef::PRIMARY).unwrap()[..], &bytes[..]);
    for blob_id in [0, 7, 10, 1234] {
        assert!(matches!(
            doc.blob(BlobRef { blob_id }),
            Err(LifError::UnresolvedBlob(id)) if id == blob_id
        ));
    }
}

#[test]
fn legacy_metadata_tag_is_accepted() {
    let meta = json!({"views": [{
        "image": {"blob_id": -1}, "width": 8, "height": 8, "f": 8,
        "inv_z_map": {"blob_id": 9, "min": 0.1, "max": 0.2}
    }]});
    let bytes = common::build_container(
        b"\xFF\xD8",
        &[(7, serde_json::to_vec(&meta).unwrap()), (9, vec![0])],
    );
    let doc = LifDocument::from_bytes(bytes, &LoadOptions::default()).unwrap();
    assert_eq!(doc.scene.views[0].width_px, 8);
}

#[test]
fn broken_metadata_aborts_the_load() {
    let bytes = common::build_container(b"\xFF\xD8", &[(8, b"{\"views\": [".to_vec())]);
    assert!(matches!(
        LifDocument::from_bytes(bytes, &LoadOptions::default()),
        Err(LifError::MalformedMetadata(_))
    ));
}

#[test]
fn stereo_pair_drives_camera_and_convergence() {
    // Two views 6 cm apart, each skewed toward the other, with a harmonic animation.
    let eye = |x: f64, sk: f64| {
        json!({
            "image": {"blob_id": -1},
            "width_px": 400, "height_px": 300, "focal_px": 400.0,
            "position": {"x": x, "y": 0.0, "z": 0.0},
            "frustum_skew": {"x": sk, "y": 0.0},
            "layers_top_to_bottom": [{
                "image": {"blob_id": 10},
                "inv_z_map": {"blob_id": 11, "min": 0.2, "max": 1.0}
            }]
        })
    };
    let meta = json!({
        "views": [eye(-0.03, 0.05), eye(0.03, -0.05)],
        "stereo_render_data": {"inv_convergence_distance": 0.4},
        "animations": [{
            "type": "harmonic", "duration_sec": 2.0,
            "data": {"position": {"x": {"amplitude": 0.05, "phase": 0.0, "bias": 0.0}}}
        }]
    });
    let bytes = container_with_json(&meta, &[(10, vec![1]), (11, vec![2])]);
    let doc = LifDocument::from_bytes(bytes, &LoadOptions::default()).unwrap();
    let views = &doc.scene.views;
    assert_eq!(views.len(), 2);
    assert_eq!(doc.scene.animations.len(), 1);

    // Render camera at a quarter period of the animation.
    let offset = doc.scene.animations[0].position_at(0.5);
    let input = CameraInput {
        offset,
        roll_degrees: 0.0,
        convergence: Convergence::Stereo { fallback_focus: 0.5 },
        viewport: Vec2::new(800.0, 600.0),
    };
    let cam = RenderCamera::for_view(&views[0], &input);
    assert!((cam.pos.x - 0.05).abs() < 1e-5);
    assert!((cam.skew.x - (-0.05 * 0.4)).abs() < 1e-5);
    assert!((cam.focal_px - 800.0).abs() < 1e-3);

    // Convergence plane of the captured pair.
    let cams: Vec<FrustumCamera> = views
        .iter()
        .map(|v| FrustumCamera {
            position: v.position,
            orientation: Quat::IDENTITY,
            frustum: Frustum::from_view(v),
        })
        .collect();
    let plane = convergence::solve(&cams[0], &cams[1]);
    assert!(!plane.degenerate);
    // Centre slope 0.1 per eye: D = 2 * 0.03 / 0.1.
    assert!((plane.position - Vec3::new(0.0, 0.0, -0.6)).length() < 1e-4);
    assert!((plane.width - 0.6 * 1.0).abs() < 1e-4);
    assert!((plane.height - 0.6 * 0.75).abs() < 1e-4);
}
