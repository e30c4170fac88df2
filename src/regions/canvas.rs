use serde::{Deserialize, Serialize};

use super::mask::RegionMask;
use super::region::Region;
use super::{Grab, Handle, RegionError, RegionKind, DEFAULT_LINEWIDTH, REGION_COLORS};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    pub region_limit: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
            region_limit: 6,
        }
    }
}

/// The set of regions over one viewport. Owns region geometry and focus;
/// time series live with the store, keyed by the ids handed out here.
#[derive(Debug, Clone)]
pub struct RegionCanvas {
    size: (f64, f64),
    limit: usize,
    regions: Vec<Region>,
}

impl RegionCanvas {
    pub fn new(config: &CanvasConfig) -> Self {
        RegionCanvas {
            size: (config.width, config.height),
            limit: config.region_limit,
            regions: Vec::new(),
        }
    }

    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn get(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.id == id)
    }

    pub fn focused(&self) -> Option<&Region> {
        self.regions.iter().find(|region| region.focused())
    }

    /// Creates a new region at `point` and focuses it. The id is the first
    /// palette color name not already in use.
    pub fn add_region(&mut self, kind: RegionKind, point: (f64, f64)) -> Result<String, RegionError> {
        if self.regions.len() >= self.limit {
            return Err(RegionError::CapacityExceeded(self.limit));
        }
        let (id, color) = self.next_color();
        let start = (
            point.0.max(0.0).min((self.size.0 - DEFAULT_LINEWIDTH).max(0.0)),
            point.1.max(0.0).min((self.size.1 - DEFAULT_LINEWIDTH).max(0.0)),
        );
        for region in &mut self.regions {
            region.set_focused(false);
        }
        let mut region = Region::new(id.clone(), kind, color, start);
        region.set_focused(true);
        self.regions.push(region);
        Ok(id)
    }

    pub fn focus_region(&mut self, id: &str) -> Result<(), RegionError> {
        if self.get(id).is_none() {
            return Err(RegionError::UnknownRegion(id.to_string()));
        }
        for region in &mut self.regions {
            let focus = region.id == id;
            region.set_focused(focus);
        }
        Ok(())
    }

    pub fn resize_region(
        &mut self,
        id: &str,
        handle: Handle,
        point: (f64, f64),
    ) -> Result<(), RegionError> {
        let size = self.size;
        self.find_mut(id)?.resize(handle, point, size)
    }

    pub fn normalize_region(&mut self, id: &str) -> Result<(), RegionError> {
        self.find_mut(id)?.normalize();
        Ok(())
    }

    pub fn move_region(&mut self, id: &str, top_left: (f64, f64)) -> Result<(), RegionError> {
        let size = self.size;
        self.find_mut(id)?.move_to(top_left, size)
    }

    /// Rescales every region for a new viewport size and adopts that size.
    pub fn rescale_all(&mut self, new_size: (f64, f64)) {
        let old = self.size;
        for region in &mut self.regions {
            region.rescale(old, new_size);
        }
        self.size = new_size;
    }

    /// Removes the region and returns it, so the owner can drop the matching
    /// series in the same transaction.
    pub fn delete_region(&mut self, id: &str) -> Result<Region, RegionError> {
        let index = self
            .regions
            .iter()
            .position(|region| region.id == id)
            .ok_or_else(|| RegionError::UnknownRegion(id.to_string()))?;
        Ok(self.regions.remove(index))
    }

    /// The closest grabbable target to `point` across all regions.
    pub fn nearest_region(&self, point: (f64, f64)) -> Option<(String, Grab)> {
        let mut best: Option<(String, Grab, f64)> = None;
        for region in &self.regions {
            if let Some((grab, dist)) = region.grab_at(point) {
                if best.as_ref().map_or(true, |(_, _, d)| dist < *d) {
                    best = Some((region.id.clone(), grab, dist));
                }
            }
        }
        best.map(|(id, grab, _)| (id, grab))
    }

    pub fn mask_for(
        &self,
        id: &str,
        width: usize,
        height: usize,
    ) -> Result<RegionMask, RegionError> {
        let region = self
            .get(id)
            .ok_or_else(|| RegionError::UnknownRegion(id.to_string()))?;
        Ok(RegionMask::for_region(region, width, height))
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Region, RegionError> {
        self.regions
            .iter_mut()
            .find(|region| region.id == id)
            .ok_or_else(|| RegionError::UnknownRegion(id.to_string()))
    }

    fn next_color(&self) -> (String, (u8, u8, u8)) {
        for (name, rgb) in REGION_COLORS {
            if self.get(name).is_none() {
                return (name.to_string(), *rgb);
            }
        }
        // Palette exhausted; fall back to numbered ids.
        let mut n = self.regions.len();
        loop {
            let id = format!("region{}", n);
            if self.get(&id).is_none() {
                let rgb = REGION_COLORS[n % REGION_COLORS.len()].1;
                return (id, rgb);
            }
            n += 1;
        }
    }
}
