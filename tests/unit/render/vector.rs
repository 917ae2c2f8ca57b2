use super::*;
use crate::animation::scheduler::FrameDelta;
use crate::pattern::params::RenderParameters;

#[test]
fn document_has_background_and_one_group_per_visible_layer() {
    let mut params = RenderParameters::default();
    params.layers[1].visible = true;
    let plan = PatternPlan::build(&params, &FrameDelta::zero(3));
    let svg = VectorExporter::new().document(&plan);

    assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="1920" height="1080""#));
    assert!(svg.contains(r##"<rect width="100%" height="100%" fill="#f5f5dc"/>"##));
    assert_eq!(svg.matches("<g ").count(), 2);
    assert_eq!(svg.matches("<path ").count(), 128);
    assert_eq!(svg.matches(r#"transform="translate(960 540) rotate(-15)""#).count(), 2);
    assert_eq!(svg.matches(r#"style="mix-blend-mode:darken""#).count(), 2);
    assert!(svg.contains(r##"fill="#d2691e""##));
    assert!(svg.contains(r##"fill="#8b0000""##));
}

#[test]
fn normal_blend_omits_style_hint() {
    let mut params = RenderParameters::default();
    params.globals.blend_enabled = false;
    let plan = PatternPlan::build(&params, &FrameDelta::zero(3));
    let svg = VectorExporter::new().document(&plan);
    assert!(!svg.contains("mix-blend-mode"));
}

#[test]
fn export_uses_fixed_file_name() {
    let plan = PatternPlan::build(&RenderParameters::default(), &FrameDelta::zero(3));
    let artifact = VectorExporter::new().export(&plan);
    assert_eq!(artifact.file_name, "pattern.svg");
    assert_eq!(artifact.mime, "image/svg+xml");
    assert!(!artifact.is_empty());
}

#[test]
fn document_parses_with_usvg() {
    let plan = PatternPlan::build(&RenderParameters::default(), &FrameDelta::zero(3));
    let svg = VectorExporter::new().document(&plan);
    let tree = usvg::Tree::from_str(&svg, &usvg::Options::default()).unwrap();
    assert_eq!(tree.size().width(), 1920.0);
    assert_eq!(tree.size().height(), 1080.0);
}
