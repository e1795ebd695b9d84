use std::fs;
use std::path::Path;

#[test]
fn validate_all_shaders() {
    let shader_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/shaders");
    assert!(shader_dir.exists(), "Shader directory not found: {shader_dir:?}");

    let mut errors = Vec::new();
    let mut validated = 0;
    for entry in fs::read_dir(&shader_dir).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().is_some_and(|ext| ext == "wgsl") {
            validate_shader(&path, &mut errors);
            validated += 1;
        }
    }

    assert_eq!(validated, 5, "expected three compute and two render shaders");
    if !errors.is_empty() {
        panic!("Shader validation failed:\n{}", errors.join("\n"));
    }
}

fn validate_shader(path: &Path, errors: &mut Vec<String>) {
    let source = fs::read_to_string(path).unwrap();
    let name = path.file_name().unwrap().to_string_lossy();
    let module = match naga::front::wgsl::parse_str(&source) {
        Ok(module) => module,
        Err(e) => {
            errors.push(format!("Failed to parse {name}:\n{}", e.emit_to_string(&source)));
            return;
        }
    };

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    if let Err(e) = validator.validate(&module) {
        errors.push(format!("Failed to validate {name}:\n{e:?}"));
    }
}

#[test]
fn compute_shaders_use_the_host_workgroup_size() {
    let shader_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/shaders");
    let expected = format!("@workgroup_size({})", gpu_cloth::simulation::params::WORKGROUP_SIZE);
    for name in ["springs.wgsl", "collision.wgsl", "normals.wgsl"] {
        let source = fs::read_to_string(shader_dir.join(name)).unwrap();
        assert!(source.contains(&expected), "{name} does not declare {expected}");
    }
}
