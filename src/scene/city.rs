//! The city view: grid, camera and visible-tile cache under one owner

use glam::Vec2;
use image::RgbaImage;
use winit::event::MouseButton;

use super::config::SceneConfig;
use crate::core::camera::{CameraLimits, CameraState, CameraUpdate};
use crate::core::camera_controller::CameraController;
use crate::core::input::InputState;
use crate::core::types::Result;
use crate::generation::GenerationConfig;
use crate::render::culling::{CullStats, TileSprite, ViewportCuller};
use crate::render::preview::{self, SELECTION_COLOR};
use crate::render::projection::{IsometricProjector, TileMetrics};
use crate::terrain::{GenerationReport, RoadParams, TerrainKind, TileCoord, TileGrid};

/// Owns the city grid, the camera and the culled set of visible tiles.
///
/// Camera writes only mark the view dirty; the visible set is rebuilt lazily
/// the next time it is read.
pub struct CityScene {
    grid: TileGrid,
    road_params: RoadParams,
    camera: CameraState,
    metrics: TileMetrics,
    screen_size: Vec2,
    culler: ViewportCuller,
    controller: CameraController,
    /// Tile picked by the last left click
    selected: Option<TileCoord>,
}

impl CityScene {
    /// Scene over an existing grid with default camera and tile settings,
    /// centered on the grid's root tile
    pub fn new(grid: TileGrid, screen_size: Vec2) -> Self {
        Self::with_settings(grid, screen_size, TileMetrics::default(), CameraLimits::default())
    }

    pub fn with_settings(grid: TileGrid, screen_size: Vec2, metrics: TileMetrics, limits: CameraLimits) -> Self {
        let mut scene = Self {
            grid,
            road_params: RoadParams::default(),
            camera: CameraState::new(limits),
            metrics,
            screen_size,
            culler: ViewportCuller::new(),
            controller: CameraController::default(),
            selected: None,
        };
        scene.center_on(scene.grid.center());
        scene
    }

    /// Generate a city and build a scene for it
    pub fn from_config(config: &SceneConfig) -> Result<(Self, GenerationReport)> {
        config.validate()?;
        let (grid, report) = config.generation.generate()?;
        let mut scene = Self::with_settings(grid, config.screen_size, config.metrics, config.camera_limits);
        scene.road_params = config.generation.road_params.clone();
        scene.controller.settings = config.controller;
        Ok((scene, report))
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn controller_mut(&mut self) -> &mut CameraController {
        &mut self.controller
    }

    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }

    /// Projector for the current camera
    pub fn projector(&self) -> IsometricProjector {
        IsometricProjector::new(self.metrics, &self.camera)
    }

    /// Terrain at `coord`, `None` outside the grid
    pub fn tile_at(&self, coord: TileCoord) -> Option<TerrainKind> {
        self.grid.get(coord)
    }

    /// Overwrite one tile. Returns false outside the grid.
    pub fn set_tile(&mut self, coord: TileCoord, kind: TerrainKind) -> bool {
        if !self.grid.set(coord, kind) {
            return false;
        }
        self.culler.refresh_tile(coord, &self.grid);
        true
    }

    /// Apply a partial camera update; see [`CameraState::apply`]
    pub fn set_camera(&mut self, update: CameraUpdate) -> bool {
        self.camera.apply(update)
    }

    /// Pan so the center of `coord` sits at the middle of the screen
    pub fn center_on(&mut self, coord: TileCoord) -> bool {
        let offset = self.projector().offset_centering(coord, self.screen_size * 0.5);
        self.camera.apply(CameraUpdate::new().offset(offset))
    }

    /// Apply one frame of input: keyboard/scroll move the camera, a left
    /// click selects the tile under the pointer (or clears the selection when
    /// it misses the grid). Returns whether the camera changed.
    pub fn update(&mut self, input: &InputState) -> bool {
        let moved = self.controller.update(&mut self.camera, input);
        if input.is_mouse_button_just_pressed(MouseButton::Left) {
            let (x, y) = input.pointer_position();
            self.selected = self.tile_at_screen_point(Vec2::new(x, y));
        }
        moved
    }

    pub fn selected(&self) -> Option<TileCoord> {
        self.selected
    }

    /// Absolute diamond corners of the selected tile
    pub fn selected_outline(&self) -> Option<[Vec2; 4]> {
        let anchor = self.screen_anchor_for_tile(self.selected?);
        Some(self.tile_diamond_polygon().map(|corner| anchor + corner))
    }

    pub fn set_screen_size(&mut self, size: Vec2) {
        if size != self.screen_size {
            self.screen_size = size;
            self.camera.mark_dirty();
        }
    }

    /// Replace the grid with a freshly generated city and re-center on it.
    /// On error the current city is kept.
    pub fn regenerate(&mut self, size: (i32, i32), seed: Option<u64>) -> Result<GenerationReport> {
        let config = GenerationConfig {
            size,
            seed,
            road_params: self.road_params.clone(),
        };
        let (grid, report) = config.generate()?;
        self.grid = grid;
        self.selected = None;
        self.culler.invalidate();
        self.camera.mark_dirty();
        self.center_on(self.grid.center());
        Ok(report)
    }

    /// Screen anchor (bounding-box top-left) of a tile under the current camera
    pub fn screen_anchor_for_tile(&self, coord: TileCoord) -> Vec2 {
        self.projector().forward(coord)
    }

    /// In-grid tile under a screen point
    pub fn tile_at_screen_point(&self, point: Vec2) -> Option<TileCoord> {
        self.projector().pick(point).filter(|coord| self.grid.contains(*coord))
    }

    /// Diamond corners relative to a tile anchor
    pub fn tile_diamond_polygon(&self) -> [Vec2; 4] {
        self.projector().tile_diamond()
    }

    /// Absolute diamond corners of the in-grid tile under `point`
    pub fn selection_outline(&self, point: Vec2) -> Option<[Vec2; 4]> {
        let coord = self.tile_at_screen_point(point)?;
        let anchor = self.screen_anchor_for_tile(coord);
        Some(self.tile_diamond_polygon().map(|corner| anchor + corner))
    }

    /// Rebuild the visible set if the camera moved since the last rebuild.
    /// Returns whether a rebuild happened.
    pub fn refresh_visible(&mut self) -> bool {
        if !self.camera.is_dirty() {
            return false;
        }
        let projector = self.projector();
        self.culler.recompute(&projector, self.screen_size, &self.grid);
        self.camera.mark_clean();
        true
    }

    /// Visible tiles as `(coord, terrain, anchor)`, back to front
    pub fn visible_tiles(&mut self) -> impl Iterator<Item = (TileCoord, TerrainKind, Vec2)> + '_ {
        self.visible_sprites().map(|sprite| (sprite.coord, sprite.terrain, sprite.anchor))
    }

    /// Visible tile sprites, back to front
    pub fn visible_sprites(&mut self) -> impl Iterator<Item = &TileSprite> + '_ {
        self.refresh_visible();
        self.culler.draw_order()
    }

    pub fn cull_stats(&self) -> CullStats {
        self.culler.last_stats()
    }

    /// Rasterize the current view, outlining the tile under `selection`, or the
    /// clicked tile when no point is given
    pub fn render_preview(&mut self, selection: Option<Vec2>) -> RgbaImage {
        self.refresh_visible();
        let width = self.screen_size.x.max(0.0) as u32;
        let height = self.screen_size.y.max(0.0) as u32;
        let mut image = preview::render_sprites(self.culler.draw_order(), width, height);
        let outline = match selection {
            Some(point) => self.selection_outline(point),
            None => self.selected_outline(),
        };
        if let Some(outline) = outline {
            preview::outline_polygon(&mut image, &outline, SELECTION_COLOR);
        }
        image
    }
}
