//! Programmatic netCDF fixtures shaped like CESM `TEMdiags` output.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const FLUX_VARS: [&str; 7] = ["Uzm", "THzm", "Vzm", "Wzm", "UVzm", "UWzm", "VTHzm"];

/// Builder for one flux file with dimensions `(time, ilev, lat)`.
pub struct FixtureBuilder {
    pub time: Vec<f64>,
    pub ilev: Vec<f64>,
    pub lat: Vec<f64>,
    /// Optional `(time, 2)` bounds written under this name.
    pub bounds: Option<(&'static str, Vec<[f64; 2]>)>,
    /// Write every field with a trailing `lon = 1` dimension.
    pub trailing_lon: bool,
    /// Variables to leave out of the file.
    pub skip: Vec<&'static str>,
    /// `(attribute, sentinel, [t, k, j])`: `Uzm` carries `attribute =
    /// sentinel` and holds the sentinel at that cell.
    pub masked: Option<(&'static str, f64, [usize; 3])>,
    /// `(scale_factor, add_offset)` applied to every flux variable.
    pub packing: Option<(f64, f64)>,
}

impl FixtureBuilder {
    pub fn new(time: Vec<f64>) -> Self {
        Self {
            time,
            ilev: vec![10.0, 100.0, 500.0, 1000.0],
            lat: vec![-60.0, -20.0, 20.0, 60.0],
            bounds: None,
            trailing_lon: false,
            skip: Vec::new(),
            masked: None,
            packing: None,
        }
    }

    pub fn with_lat(mut self, lat: Vec<f64>) -> Self {
        self.lat = lat;
        self
    }

    /// Bounds of one time unit ending at each nominal time.
    pub fn with_bounds(mut self, name: &'static str) -> Self {
        self.bounds = Some((name, self.time.iter().map(|&t| [t - 1.0, t]).collect()));
        self
    }

    pub fn with_trailing_lon(mut self) -> Self {
        self.trailing_lon = true;
        self
    }

    pub fn with_fill_value(mut self, fill: f64, cell: [usize; 3]) -> Self {
        self.masked = Some(("_FillValue", fill, cell));
        self
    }

    pub fn with_missing_value(mut self, missing: f64, cell: [usize; 3]) -> Self {
        self.masked = Some(("missing_value", missing, cell));
        self
    }

    /// Store every flux as `(value - offset) / scale`.
    pub fn with_packing(mut self, scale: f64, offset: f64) -> Self {
        self.packing = Some((scale, offset));
        self
    }

    pub fn without(mut self, var: &'static str) -> Self {
        self.skip.push(var);
        self
    }

    /// Value of flux variable number `v` at `(t, k, j)`, where `t` is the
    /// nominal time value so concatenated files stay distinguishable.
    pub fn value(v: usize, t: f64, k: usize, j: usize, ilev: &[f64], lat: &[f64]) -> f64 {
        let phi = lat[j].to_radians();
        let p = ilev[k];
        match v {
            0 => 20.0 * phi.cos() + 0.01 * p + t,
            1 => 800.0 - 0.4 * p + 10.0 * phi.cos(),
            2 => 0.5 * phi.sin() + 0.001 * t,
            3 => 1e-3 * phi.cos(),
            4 => 15.0 * (2.0 * phi).sin(),
            5 => 0.02 * phi.sin(),
            _ => 5.0 * phi.sin() * (p / 1000.0),
        }
    }

    pub fn write(&self, path: &Path) -> PathBuf {
        let (nt, nk, nj) = (self.time.len(), self.ilev.len(), self.lat.len());
        let mut file = netcdf::create(path).expect("create netcdf fixture");

        file.add_dimension("time", nt).expect("dim time");
        file.add_dimension("ilev", nk).expect("dim ilev");
        file.add_dimension("lat", nj).expect("dim lat");
        if self.trailing_lon {
            file.add_dimension("lon", 1).expect("dim lon");
        }
        if self.bounds.is_some() {
            file.add_dimension("nbnd", 2).expect("dim nbnd");
        }

        {
            let mut var = file.add_variable::<f64>("time", &["time"]).expect("var time");
            var.put_values(&self.time, ..).expect("time values");
            var.put_attribute("units", "days since 0001-01-01 00:00:00")
                .expect("time units");
            var.put_attribute("calendar", "noleap").expect("time calendar");
        }
        {
            let mut var = file.add_variable::<f64>("ilev", &["ilev"]).expect("var ilev");
            var.put_values(&self.ilev, ..).expect("ilev values");
            var.put_attribute("units", "hPa").expect("ilev units");
            var.put_attribute("long_name", "interface levels")
                .expect("ilev long_name");
            var.put_attribute("positive", "down").expect("ilev positive");
        }
        {
            let mut var = file.add_variable::<f64>("lat", &["lat"]).expect("var lat");
            var.put_values(&self.lat, ..).expect("lat values");
            var.put_attribute("long_name", "latitude").expect("lat long_name");
        }
        if let Some((name, bounds)) = &self.bounds {
            let flat: Vec<f64> = bounds.iter().flat_map(|b| b.iter().copied()).collect();
            let mut var = file
                .add_variable::<f64>(name, &["time", "nbnd"])
                .expect("var bounds");
            var.put_values(&flat, ..).expect("bounds values");
        }

        let dims: &[&str] = if self.trailing_lon {
            &["time", "ilev", "lat", "lon"]
        } else {
            &["time", "ilev", "lat"]
        };
        for (v, name) in FLUX_VARS.iter().enumerate() {
            if self.skip.contains(name) {
                continue;
            }
            let masked = self.masked.filter(|_| v == 0);
            let mut data = Vec::with_capacity(nt * nk * nj);
            for (n, &t) in self.time.iter().enumerate() {
                for k in 0..nk {
                    for j in 0..nj {
                        let value = Self::value(v, t, k, j, &self.ilev, &self.lat);
                        let stored = match (masked, self.packing) {
                            (Some((_, sentinel, cell)), _) if cell == [n, k, j] => sentinel,
                            (_, Some((scale, offset))) => (value - offset) / scale,
                            _ => value,
                        };
                        data.push(stored);
                    }
                }
            }
            let mut var = file.add_variable::<f64>(name, dims).expect("var flux");
            if let Some((attr, sentinel, _)) = masked {
                var.put_attribute(attr, sentinel).expect("mask attribute");
            }
            if let Some((scale, offset)) = self.packing {
                var.put_attribute("scale_factor", scale).expect("scale_factor");
                var.put_attribute("add_offset", offset).expect("add_offset");
            }
            var.put_values(&data, ..).expect("flux values");
        }

        path.to_path_buf()
    }
}
