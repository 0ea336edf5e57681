//! End-to-end discovery over fixture directory trees.

use std::fs;
use std::path::Path;

use open_with::{ProgramFinder, SearchPaths};
use tempfile::TempDir;

struct Fixture {
    data: TempDir,
    icons: TempDir,
    cache: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            data: TempDir::new().unwrap(),
            icons: TempDir::new().unwrap(),
            cache: TempDir::new().unwrap(),
        }
    }

    fn write_desktop(&self, name: &str, body: &str) {
        write_desktop(self.data.path(), name, body);
    }

    fn write_icon(&self, relative: &str) {
        let path = self.icons.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"icon").unwrap();
    }

    fn paths(&self) -> SearchPaths {
        SearchPaths {
            data_dirs: vec![self.data.path().to_path_buf()],
            icon_roots: vec![self.icons.path().to_path_buf()],
            icon_cache_file: self.cache.path().join("icon-theme-cache.json"),
            language: Some("fr".to_string()),
        }
    }
}

fn write_desktop(data_dir: &Path, name: &str, body: &str) {
    let apps = data_dir.join("applications");
    fs::create_dir_all(&apps).unwrap();
    fs::write(apps.join(name), body).unwrap();
}

#[test]
fn finds_programs_matching_requested_extensions() {
    let fx = Fixture::new();
    fx.write_desktop(
        "viewer.desktop",
        "[Desktop Entry]\nType=Application\nName=Viewer\nName[fr]=Visionneuse\n\
         Exec=viewer %f\nMimeType=image/jpeg;\nIcon=viewer\n",
    );
    fx.write_desktop(
        "gimp.desktop",
        "[Desktop Entry]\nType=Application\nName=Gimp\n\
         Exec=gimp %f\nMimeType=image/jpeg;image/png;\n",
    );
    fx.write_desktop(
        "editor.desktop",
        "[Desktop Entry]\nType=Application\nName=Editor\n\
         Exec=editor %f\nMimeType=text/plain;\n",
    );
    fx.write_icon("hicolor/48x48/viewer.png");

    let finder = ProgramFinder::new();
    let programs = finder.find_programs_in(&fx.paths(), &["jpeg"]).unwrap();

    assert_eq!(programs.len(), 2);
    // sorted by localized name: Gimp before Visionneuse
    assert_eq!(programs[0].name, "Gimp");
    assert_eq!(programs[1].name, "Visionneuse");
    assert_eq!(programs[1].exec, vec!["viewer", "%f"]);
    assert_eq!(
        programs[1].icon.as_deref(),
        Some(fx.icons.path().join("hicolor/48x48/viewer.png").as_path())
    );
    assert!(programs[0].icon.is_none());
    assert!(programs[1].mime_types.contains("image/jpeg"));
}

#[test]
fn empty_result_is_ok_not_error() {
    let fx = Fixture::new();
    fx.write_desktop(
        "editor.desktop",
        "[Desktop Entry]\nType=Application\nName=Editor\n\
         Exec=editor %f\nMimeType=text/plain;\n",
    );

    let programs = ProgramFinder::new()
        .find_programs_in(&fx.paths(), &["jpeg"])
        .unwrap();
    assert!(programs.is_empty());
}

#[test]
fn higher_priority_root_shadows_same_base_name() {
    let fx = Fixture::new();
    let low = TempDir::new().unwrap();
    fx.write_desktop(
        "viewer.desktop",
        "[Desktop Entry]\nType=Application\nName=User Viewer\n\
         Exec=viewer %f\nMimeType=image/jpeg;\n",
    );
    write_desktop(
        low.path(),
        "viewer.desktop",
        "[Desktop Entry]\nType=Application\nName=System Viewer\n\
         Exec=viewer %f\nMimeType=image/jpeg;\n",
    );

    let mut paths = fx.paths();
    paths.data_dirs.push(low.path().to_path_buf());
    let programs = ProgramFinder::new().find_programs_in(&paths, &["jpg"]).unwrap();

    assert_eq!(programs.len(), 1);
    assert_eq!(programs[0].name, "User Viewer");
}

#[test]
fn hidden_entries_are_never_listed() {
    let fx = Fixture::new();
    fx.write_desktop(
        "viewer.desktop",
        "[Desktop Entry]\nType=Application\nName=Viewer\nHidden=true\n\
         Exec=viewer %f\nMimeType=image/jpeg;\n",
    );

    let programs = ProgramFinder::new()
        .find_programs_in(&fx.paths(), &["jpeg"])
        .unwrap();
    assert!(programs.is_empty());
}

#[test]
fn unresolvable_icon_is_dropped_not_propagated() {
    let fx = Fixture::new();
    fx.write_desktop(
        "viewer.desktop",
        "[Desktop Entry]\nType=Application\nName=Viewer\n\
         Exec=viewer %f\nMimeType=image/jpeg;\nIcon=no-such-icon\n",
    );

    let programs = ProgramFinder::new()
        .find_programs_in(&fx.paths(), &["jpeg"])
        .unwrap();
    assert_eq!(programs.len(), 1);
    assert!(programs[0].icon.is_none());
}

#[test]
fn absolute_icon_reference_passes_through() {
    let fx = Fixture::new();
    fx.write_desktop(
        "viewer.desktop",
        "[Desktop Entry]\nType=Application\nName=Viewer\n\
         Exec=viewer %f\nMimeType=image/jpeg;\nIcon=/opt/viewer/icon.png\n",
    );

    let programs = ProgramFinder::new()
        .find_programs_in(&fx.paths(), &["jpeg"])
        .unwrap();
    assert_eq!(
        programs[0].icon.as_deref(),
        Some(Path::new("/opt/viewer/icon.png"))
    );
}

#[test]
fn names_sort_numeric_aware_and_case_insensitive() {
    let fx = Fixture::new();
    for (file, name) in [
        ("a.desktop", "photo 10"),
        ("b.desktop", "Photo 2"),
        ("c.desktop", "album"),
    ] {
        fx.write_desktop(
            file,
            &format!(
                "[Desktop Entry]\nType=Application\nName={name}\n\
                 Exec=prog %f\nMimeType=image/jpeg;\n"
            ),
        );
    }

    let programs = ProgramFinder::new()
        .find_programs_in(&fx.paths(), &["jpeg"])
        .unwrap();
    let names: Vec<&str> = programs.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["album", "Photo 2", "photo 10"]);
}

#[test]
fn equal_comparing_names_keep_a_fixed_order() {
    let fx = Fixture::new();
    // "viewer" and "Viewer" compare equal case-insensitively; the tie must
    // fall back to .desktop base-name order, run after run
    fx.write_desktop(
        "a.desktop",
        "[Desktop Entry]\nType=Application\nName=viewer\n\
         Exec=alpha %f\nMimeType=image/jpeg;\n",
    );
    fx.write_desktop(
        "b.desktop",
        "[Desktop Entry]\nType=Application\nName=Viewer\n\
         Exec=beta %f\nMimeType=image/jpeg;\n",
    );

    let paths = fx.paths();
    for _ in 0..20 {
        let programs = ProgramFinder::new().find_programs_in(&paths, &["jpeg"]).unwrap();
        let commands: Vec<&str> = programs.iter().map(|p| p.exec[0].as_str()).collect();
        assert_eq!(commands, vec!["alpha", "beta"]);
    }
}

#[test]
fn second_run_reuses_cache_without_rewriting_it() {
    let fx = Fixture::new();
    fx.write_desktop(
        "viewer.desktop",
        "[Desktop Entry]\nType=Application\nName=Viewer\n\
         Exec=viewer %f\nMimeType=image/jpeg;\nIcon=viewer\n",
    );
    fx.write_icon("hicolor/scalable/viewer.svg");
    let paths = fx.paths();

    ProgramFinder::new().find_programs_in(&paths, &["jpeg"]).unwrap();
    let first = fs::read(&paths.icon_cache_file).unwrap();

    // a fresh finder must reload the cache and leave the file untouched
    let mut marked = first.clone();
    marked.push(b'\n');
    fs::write(&paths.icon_cache_file, &marked).unwrap();

    let programs = ProgramFinder::new().find_programs_in(&paths, &["jpeg"]).unwrap();
    assert_eq!(
        programs[0].icon.as_deref(),
        Some(fx.icons.path().join("hicolor/scalable/viewer.svg").as_path())
    );
    assert_eq!(fs::read(&paths.icon_cache_file).unwrap(), marked);
}
