//! Random placement of sphere instances.
//!
//! A single [`GeodesicSphere`] tessellation can be shared by many instances,
//! each of which places it with a uniform scale and a translation and shades
//! it with its own diffuse color. See [`TriangleSoup::instanced`].
//!
//! [`GeodesicSphere`]: crate::primitive::sphere::GeodesicSphere
//! [`TriangleSoup::instanced`]: crate::buffer::TriangleSoup::instanced

use rand::Rng;

use crate::geometry::{GeometryError, Matrix4, Vector3};

/// Parameters of sphere scattering.
///
/// Translations are sampled from $[-h, h)^3$ where $h$ is `half_extent` and
/// scales are sampled from $[0, s)$ where $s$ is `max_scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterConfig {
    pub count: usize,
    pub half_extent: f32,
    pub max_scale: f32,
}

impl ScatterConfig {
    pub fn new(count: usize) -> Self {
        ScatterConfig {
            count,
            ..Default::default()
        }
    }

    pub fn with_half_extent(self, half_extent: f32) -> Self {
        ScatterConfig {
            half_extent,
            ..self
        }
    }

    pub fn with_max_scale(self, max_scale: f32) -> Self {
        ScatterConfig { max_scale, ..self }
    }

    fn validate(&self) -> Result<(), GeometryError> {
        if !(self.half_extent.is_finite() && self.half_extent > 0.0) {
            return Err(GeometryError::invalid_argument(
                "half_extent",
                format!("{} is not a finite positive extent", self.half_extent),
            ));
        }
        if !(self.max_scale.is_finite() && self.max_scale > 0.0) {
            return Err(GeometryError::invalid_argument(
                "max_scale",
                format!("{} is not a finite positive scale", self.max_scale),
            ));
        }
        Ok(())
    }
}

impl Default for ScatterConfig {
    fn default() -> Self {
        ScatterConfig {
            count: 1,
            half_extent: 2.5,
            max_scale: 0.3,
        }
    }
}

/// Placement and color of a sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereInstance {
    pub translation: Vector3<f32>,
    pub scale: f32,
    /// Linear RGB color in $[0, 1)^3$.
    pub diffuse: [f32; 3],
}

impl SphereInstance {
    /// Gets the model transform of the instance, which scales and then
    /// translates.
    pub fn transform(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.translation) * Matrix4::new_scaling(self.scale)
    }
}

/// Samples sphere instances.
///
/// # Errors
///
/// Returns an error if the extent or the maximum scale of the configuration is
/// not finite and positive.
///
/// # Examples
///
/// ```rust
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use terrane::primitive::scatter::{self, ScatterConfig};
///
/// let instances = scatter::scatter(&ScatterConfig::new(8), &mut StdRng::seed_from_u64(1)).unwrap();
/// assert_eq!(8, instances.len());
/// ```
pub fn scatter<R>(config: &ScatterConfig, rng: &mut R) -> Result<Vec<SphereInstance>, GeometryError>
where
    R: Rng + ?Sized,
{
    config.validate()?;
    let h = config.half_extent;
    let instances = (0..config.count)
        .map(|_| SphereInstance {
            translation: Vector3::from_fn(|_, _| rng.gen_range(-h..h)),
            scale: rng.gen_range(0.0..config.max_scale),
            diffuse: [rng.gen(), rng.gen(), rng.gen()],
        })
        .collect::<Vec<_>>();
    log::debug!("scattered {} sphere instances", instances.len());
    Ok(instances)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::buffer::TriangleSoup;
    use crate::geometry::{Vector3, E3};
    use crate::primitive::scatter::{scatter, ScatterConfig, SphereInstance};
    use crate::primitive::sphere::GeodesicSphere;

    #[test]
    fn instances_are_in_range() {
        let config = ScatterConfig::new(200);
        let instances = scatter(&config, &mut StdRng::seed_from_u64(3)).unwrap();

        assert_eq!(200, instances.len());
        for instance in instances {
            assert!(instance.translation.iter().all(|x| (-2.5..2.5).contains(x)));
            assert!((0.0..0.3).contains(&instance.scale));
            assert!(instance.diffuse.iter().all(|x| (0.0..1.0).contains(x)));
        }
    }

    #[test]
    fn reject_empty_extent() {
        let config = ScatterConfig::new(1).with_half_extent(0.0);
        assert!(scatter(&config, &mut StdRng::seed_from_u64(3)).is_err());
    }

    #[test]
    fn transform_agrees_with_instanced_soup() {
        let instance = SphereInstance {
            translation: Vector3::new(1.0, -2.0, 0.5),
            scale: 0.25,
            diffuse: [1.0, 0.0, 0.0],
        };
        let soup: TriangleSoup = GeodesicSphere::try_new(1).unwrap().tessellate();
        let placed = soup.instanced(&instance);
        let transform = instance.transform();

        for (position, expected) in soup
            .as_position_slice()
            .iter()
            .zip(placed.as_position_slice())
        {
            let transformed: E3 = transform.transform_point(position);
            assert_abs_diff_eq!(*expected, transformed, epsilon = 1e-6);
        }
    }
}
