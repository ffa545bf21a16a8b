//! Sequential preload queue.

use super::decode::{decode_cubemap, decode_texture};
use super::model_json::parse_model;
use super::{
    AssetEntry, AssetError, AssetFetcher, AssetKind, AssetRequest, AssetStore,
    CubemapEntry, FetchedAsset, Manifest,
};
use crate::scene::{CubemapData, MeshData, TextureData};

/// Where the queue stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadState {
    /// Requests remain or one is in flight.
    Preloading,
    /// Everything has been fetched and decoded.
    Ready,
}

/// Drains a [`Manifest`] one request at a time.
///
/// Each list is popped from its end. Textures go first, then models, then
/// cubemaps, then the font. A new request is only handed out once the
/// previous one has completed, and completion always advances the queue:
/// failures are logged and replaced by placeholders.
#[derive(Debug)]
pub struct Preloader {
    textures: Vec<AssetEntry>,
    models: Vec<AssetEntry>,
    cubemaps: Vec<CubemapEntry>,
    font: Option<String>,
    in_flight: Option<AssetRequest>,
    store: AssetStore,
    total: usize,
    completed: usize,
    failed: usize,
    ready_reported: bool,
}

impl Preloader {
    /// Queue everything in `manifest`.
    #[must_use]
    pub fn new(manifest: Manifest) -> Self {
        let total = manifest.request_count();
        Self {
            textures: manifest.textures,
            models: manifest.models,
            cubemaps: manifest.cubemaps,
            font: manifest.font,
            in_flight: None,
            store: AssetStore::new(),
            total,
            completed: 0,
            failed: 0,
            ready_reported: false,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PreloadState {
        let queued = !self.textures.is_empty()
            || !self.models.is_empty()
            || !self.cubemaps.is_empty()
            || self.font.is_some();
        if queued || self.in_flight.is_some() {
            PreloadState::Preloading
        } else {
            PreloadState::Ready
        }
    }

    /// Completed fraction in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f32 / self.total as f32
        }
    }

    /// Number of requests that fell back to a placeholder.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// The request currently being fetched.
    #[must_use]
    pub fn in_flight(&self) -> Option<&AssetRequest> {
        self.in_flight.as_ref()
    }

    /// Hand out the next request, or `None` while one is in flight or the
    /// queue is empty.
    pub fn start_next(&mut self) -> Option<AssetRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let request = if let Some(entry) = self.textures.pop() {
            single(AssetKind::Texture, entry)
        } else if let Some(entry) = self.models.pop() {
            single(AssetKind::Model, entry)
        } else if let Some(entry) = self.cubemaps.pop() {
            AssetRequest {
                kind: AssetKind::Cubemap,
                name: entry.name,
                files: entry.files.to_vec(),
            }
        } else {
            let file = self.font.take()?;
            AssetRequest {
                kind: AssetKind::Font,
                name: "font".to_owned(),
                files: vec![file],
            }
        };
        log::debug!("preloading {:?} '{}'", request.kind, request.name);
        self.in_flight = Some(request.clone());
        Some(request)
    }

    /// Decode a finished fetch into the store and free the queue.
    ///
    /// Results that do not match the in-flight request are ignored.
    pub fn complete(&mut self, fetched: FetchedAsset) {
        if self.in_flight.as_ref() != Some(&fetched.request) {
            log::warn!(
                "ignoring unexpected asset result for '{}'",
                fetched.request.name
            );
            return;
        }
        self.in_flight = None;
        self.completed += 1;

        let request = fetched.request;
        let result = fetched.files.and_then(|files| self.store_decoded(&request, files));
        if let Err(e) = result {
            log::warn!("{e}; using placeholder");
            self.failed += 1;
            self.store_placeholder(&request);
        }
    }

    /// Advance by at most one fetch: collect a finished result, then issue
    /// the next request. Returns `true` exactly once, on the call that
    /// observes the queue becoming ready.
    pub fn pump(&mut self, fetcher: &mut dyn AssetFetcher) -> bool {
        if let Some(fetched) = fetcher.poll() {
            self.complete(fetched);
        }
        if let Some(request) = self.start_next() {
            fetcher.fetch(&request);
        }
        self.poll_ready()
    }

    /// `true` the first time the queue is observed empty, `false` before
    /// and after.
    pub fn poll_ready(&mut self) -> bool {
        if self.ready_reported || self.state() != PreloadState::Ready {
            return false;
        }
        self.ready_reported = true;
        log::info!(
            "preload finished: {} assets, {} placeholders",
            self.completed,
            self.failed
        );
        true
    }

    /// Loaded assets.
    #[must_use]
    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    fn store_decoded(
        &mut self,
        request: &AssetRequest,
        files: Vec<Vec<u8>>,
    ) -> Result<(), AssetError> {
        let name = request.name.as_str();
        let mut files = files.into_iter();
        match request.kind {
            AssetKind::Cubemap => {
                let faces: Vec<_> = files.collect();
                self.store.insert_cubemap(name, decode_cubemap(name, &faces)?);
            }
            kind => {
                let bytes = files.next().ok_or_else(|| AssetError::Decode {
                    name: name.to_owned(),
                    reason: "no data".to_owned(),
                })?;
                match kind {
                    AssetKind::Texture => {
                        self.store.insert_texture(name, decode_texture(name, &bytes)?);
                    }
                    AssetKind::Model => {
                        self.store.insert_model(name, parse_model(name, &bytes)?);
                    }
                    _ => {
                        if bytes.is_empty() {
                            return Err(AssetError::Decode {
                                name: name.to_owned(),
                                reason: "empty font file".to_owned(),
                            });
                        }
                        self.store.set_font(bytes);
                    }
                }
            }
        }
        Ok(())
    }

    fn store_placeholder(&mut self, request: &AssetRequest) {
        let name = request.name.as_str();
        match request.kind {
            AssetKind::Texture => self.store.insert_texture(name, TextureData::placeholder()),
            AssetKind::Model => self.store.insert_model(name, MeshData::empty()),
            AssetKind::Cubemap => self.store.insert_cubemap(name, CubemapData::placeholder()),
            AssetKind::Font => {}
        }
    }
}

fn single(kind: AssetKind, entry: AssetEntry) -> AssetRequest {
    AssetRequest {
        kind,
        name: entry.name,
        files: vec![entry.file],
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Answers each fetch on the following poll with canned bytes.
    #[derive(Default)]
    struct MockFetcher {
        pending: VecDeque<AssetRequest>,
        log: Vec<String>,
        fail: Vec<String>,
    }

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    impl AssetFetcher for MockFetcher {
        fn fetch(&mut self, request: &AssetRequest) {
            self.log.push(request.name.clone());
            self.pending.push_back(request.clone());
        }

        fn poll(&mut self) -> Option<FetchedAsset> {
            let request = self.pending.pop_front()?;
            let files = if self.fail.contains(&request.name) {
                Err(AssetError::Fetch {
                    file: request.files[0].clone(),
                    reason: "404".to_owned(),
                })
            } else {
                Ok(request
                    .files
                    .iter()
                    .map(|_| match request.kind {
                        AssetKind::Texture | AssetKind::Cubemap => tiny_png(),
                        AssetKind::Model => {
                            br#"{"vertices":[0,0,0,1,0,0,0,1,0],"faces":[0,0,1,2]}"#.to_vec()
                        }
                        AssetKind::Font => vec![0, 1, 0, 0],
                    })
                    .collect())
            };
            Some(FetchedAsset { request, files })
        }
    }

    fn entry(name: &str) -> AssetEntry {
        AssetEntry {
            name: name.to_owned(),
            file: format!("{name}.bin"),
        }
    }

    fn small_manifest() -> Manifest {
        Manifest {
            textures: vec![entry("t1"), entry("t2")],
            models: vec![entry("m1"), entry("m2")],
            cubemaps: vec![CubemapEntry {
                name: "sky".to_owned(),
                files: std::array::from_fn(|i| format!("face{i}.png")),
            }],
            font: Some("font.ttf".to_owned()),
        }
    }

    fn run(preloader: &mut Preloader, fetcher: &mut MockFetcher) -> usize {
        let mut ready_count = 0;
        for _ in 0..50 {
            if preloader.pump(fetcher) {
                ready_count += 1;
            }
        }
        ready_count
    }

    #[test]
    fn drains_lists_from_the_end_in_category_order() {
        let mut preloader = Preloader::new(small_manifest());
        let mut fetcher = MockFetcher::default();
        assert_eq!(run(&mut preloader, &mut fetcher), 1);
        assert_eq!(fetcher.log, vec!["t2", "t1", "m2", "m1", "sky", "font"]);
        assert_eq!(preloader.state(), PreloadState::Ready);
        assert_eq!(preloader.progress(), 1.0);
        let store = preloader.store();
        assert_eq!(store.texture("t1").width, 2);
        assert_eq!(store.model("m2").triangle_count(), 1);
        assert_eq!(store.cubemap("sky").size, 2);
        assert!(store.font().is_some());
    }

    #[test]
    fn only_one_request_in_flight() {
        let mut preloader = Preloader::new(small_manifest());
        let first = preloader.start_next();
        assert!(first.is_some());
        assert!(preloader.start_next().is_none());
        assert_eq!(preloader.in_flight(), first.as_ref());
    }

    #[test]
    fn failures_become_placeholders_and_queue_continues() {
        let mut preloader = Preloader::new(small_manifest());
        let mut fetcher = MockFetcher {
            fail: vec!["t2".to_owned(), "m1".to_owned(), "font".to_owned()],
            ..MockFetcher::default()
        };
        assert_eq!(run(&mut preloader, &mut fetcher), 1);
        assert_eq!(preloader.failed(), 3);
        assert_eq!(*preloader.store().texture("t2"), TextureData::placeholder());
        assert!(preloader.store().model("m1").is_empty());
        assert!(preloader.store().font().is_none());
        assert_eq!(preloader.store().texture("t1").width, 2);
    }

    #[test]
    fn empty_manifest_is_ready_immediately_once() {
        let mut preloader = Preloader::new(Manifest::empty());
        let mut fetcher = MockFetcher::default();
        assert!(preloader.pump(&mut fetcher));
        assert!(!preloader.pump(&mut fetcher));
        assert!(fetcher.log.is_empty());
    }

    #[test]
    fn mismatched_result_is_ignored() {
        let mut preloader = Preloader::new(small_manifest());
        let _ = preloader.start_next();
        preloader.complete(FetchedAsset {
            request: single(AssetKind::Model, entry("other")),
            files: Ok(vec![]),
        });
        assert!(preloader.in_flight().is_some());
        assert_eq!(preloader.progress(), 0.0);
    }
}
