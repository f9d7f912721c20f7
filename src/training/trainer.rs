use crate::classifiers::{FitError, Label, SvmClassifier};
use crate::features::{ColorHistogram, FeatureVector};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("no usable training images under {}", .0.display())]
    EmptyClass(PathBuf),
    #[error(transparent)]
    Fit(#[from] FitError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The two labeled image directories a classifier is trained from.
///
/// Each directory denotes one class. Neither path should be a
/// subdirectory of the other; that precondition is not mechanically
/// enforced.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub class_a: PathBuf,
    pub class_b: PathBuf,
}

/// Trains a classifier from the two class directories.
///
/// All regular files under each directory are enumerated recursively
/// (symbolic links excluded) and run through the extractor; files that
/// cannot be decoded or are rejected do not abort training, they are
/// skipped. Class-A samples are labeled before class-B samples, and a
/// class that yields no usable sample fails training before the fit
/// capability is ever invoked.
pub fn train(set: &TrainingSet, extractor: &ColorHistogram) -> Result<SvmClassifier, TrainingError> {
    for path in [&set.class_a, &set.class_b] {
        if !path.is_dir() {
            return Err(TrainingError::NotADirectory(path.clone()));
        }
    }

    let class_a = collect_class_features(&set.class_a, extractor)?;
    if class_a.is_empty() {
        return Err(TrainingError::EmptyClass(set.class_a.clone()));
    }
    let class_b = collect_class_features(&set.class_b, extractor)?;
    if class_b.is_empty() {
        return Err(TrainingError::EmptyClass(set.class_b.clone()));
    }

    let mut labels = vec![Label::ClassA; class_a.len()];
    labels.extend(std::iter::repeat_n(Label::ClassB, class_b.len()));
    let mut features = class_a;
    features.extend(class_b);

    Ok(SvmClassifier::fit(&features, &labels)?)
}

fn collect_class_features(
    dir: &Path,
    extractor: &ColorHistogram,
) -> Result<Vec<FeatureVector>, TrainingError> {
    let mut features = Vec::new();
    visit(dir, extractor, &mut features)?;
    Ok(features)
}

fn visit(
    dir: &Path,
    extractor: &ColorHistogram,
    features: &mut Vec<FeatureVector>,
) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_symlink() {
            continue;
        }
        let path = entry.path();
        if file_type.is_dir() {
            visit(&path, extractor, features)?;
        } else {
            match image_features(&path, extractor) {
                Some(f) => features.push(f),
                None => debug!(path = %path.display(), "skipping unusable training file"),
            }
        }
    }
    Ok(())
}

fn image_features(path: &Path, extractor: &ColorHistogram) -> Option<FeatureVector> {
    let bytes = fs::read(path).ok()?;
    let image = image::load_from_memory(&bytes).ok()?;
    extractor.extract(&image).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::Classifier;
    use crate::testing::dummies::{png_bytes, solid_rgb, two_tone_rgb};
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn write_class_images(dir: &Path, primary: [u8; 3]) {
        for i in 0..10u32 {
            let image = two_tone_rgb(primary, [255, 255, 255], 44 + 2 * i);
            fs::write(dir.join(format!("{i}.png")), png_bytes(&image)).unwrap();
        }
    }

    fn populated_set() -> (TempDir, TrainingSet) {
        let root = tempdir().unwrap();
        let class_a = root.path().join("reds");
        let class_b = root.path().join("blues");
        fs::create_dir(&class_a).unwrap();
        fs::create_dir(&class_b).unwrap();
        write_class_images(&class_a, [255, 0, 0]);
        write_class_images(&class_b, [0, 0, 255]);
        let set = TrainingSet { class_a, class_b };
        (root, set)
    }

    #[test]
    fn missing_path_is_not_a_directory() {
        let (_root, mut set) = populated_set();
        set.class_a = PathBuf::from("/nonexistent/reds");

        let err = train(&set, &ColorHistogram::default()).unwrap_err();
        assert!(matches!(err, TrainingError::NotADirectory(p) if p == set.class_a));
    }

    #[test]
    fn a_plain_file_is_not_a_directory() {
        let (root, mut set) = populated_set();
        let file = root.path().join("not-a-dir");
        fs::write(&file, b"x").unwrap();
        set.class_b = file;

        let err = train(&set, &ColorHistogram::default()).unwrap_err();
        assert!(matches!(err, TrainingError::NotADirectory(p) if p == set.class_b));
    }

    #[test]
    fn a_class_without_usable_images_fails() {
        let (_root, set) = populated_set();
        for entry in fs::read_dir(&set.class_b).unwrap() {
            fs::remove_file(entry.unwrap().path()).unwrap();
        }

        let err = train(&set, &ColorHistogram::default()).unwrap_err();
        assert!(matches!(err, TrainingError::EmptyClass(p) if p == set.class_b));
    }

    #[test]
    fn undecodable_files_are_skipped() {
        let (_root, set) = populated_set();
        fs::write(set.class_a.join("notes.txt"), b"not an image").unwrap();

        let model = train(&set, &ColorHistogram::default()).unwrap();
        let red = ColorHistogram::default()
            .extract(&solid_rgb([255, 0, 0], 8, 8))
            .unwrap();
        assert_eq!(model.predict(&red), Label::ClassA);
    }

    #[test]
    fn nested_directories_are_enumerated() {
        let (_root, set) = populated_set();
        // Move half of class A into a subdirectory; training must still
        // see every sample.
        let nested = set.class_a.join("nested");
        fs::create_dir(&nested).unwrap();
        for i in 0..5 {
            let name = format!("{i}.png");
            fs::rename(set.class_a.join(&name), nested.join(&name)).unwrap();
        }

        assert!(train(&set, &ColorHistogram::default()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn symbolic_links_are_not_training_samples() {
        let (_root, mut set) = populated_set();
        let linked = set.class_a.parent().unwrap().join("linked");
        fs::create_dir(&linked).unwrap();
        std::os::unix::fs::symlink(set.class_b.join("0.png"), linked.join("0.png")).unwrap();
        set.class_a = linked;

        // The only entry is a symlink, so the class has no samples.
        let err = train(&set, &ColorHistogram::default()).unwrap_err();
        assert!(matches!(err, TrainingError::EmptyClass(p) if p == set.class_a));
    }

    #[test]
    fn separable_directories_train_a_working_model() {
        let (_root, set) = populated_set();
        let extractor = ColorHistogram::default();

        let model = train(&set, &extractor).unwrap();

        let red = extractor.extract(&solid_rgb([255, 0, 0], 8, 8)).unwrap();
        let blue = extractor.extract(&solid_rgb([0, 0, 255], 8, 8)).unwrap();
        assert_eq!(model.predict(&red), Label::ClassA);
        assert_eq!(model.predict(&blue), Label::ClassB);
    }
}
