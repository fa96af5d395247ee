use rand::Rng;

use crate::{Color, CrateRng, Hit, Ray, Vec3};

/// A scattered ray and its color information
#[derive(Debug)]
pub struct Scatter {
    pub attenuation: Color,
    pub ray: Ray,
}
impl Scatter {
    pub fn new(attenuation: Color, ray: Ray) -> Self {
        Self { attenuation, ray }
    }
}

/// Surface behavior shared by reference between any number of shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
    DiffuseLight(DiffuseLight),
}
impl Material {
    /// A material will either absorb a ray (`None`) or scatter it.
    pub fn scatter(&self, ray: &Ray, hit: &Hit, rng: &mut CrateRng) -> Option<Scatter> {
        match self {
            Material::Lambertian(m) => m.scatter(ray, hit, rng),
            Material::Metal(m) => m.scatter(ray, hit, rng),
            Material::Dielectric(m) => m.scatter(ray, hit, rng),
            Material::DiffuseLight(_) => None,
        }
    }

    /// Light given off by the surface. Only `DiffuseLight` emits.
    pub fn emitted(&self) -> Option<Color> {
        match self {
            Material::DiffuseLight(light) => Some(light.emitted()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Diffuse reflection
pub struct Lambertian {
    pub albedo: Color,
}
impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn scatter(&self, _ray: &Ray, hit: &Hit, rng: &mut CrateRng) -> Option<Scatter> {
        let mut scatter_dir = hit.normal + Vec3::random_unit_vector(rng);
        // The random vector can almost cancel the normal out
        if scatter_dir.near_zero() {
            scatter_dir = hit.normal;
        }
        let scattered = Ray::new(hit.point, scatter_dir);
        Some(Scatter::new(self.albedo, scattered))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Metal {
    pub albedo: Color,
    /// The fuzziness of the Metal. Is between `0.0` and `1.0`
    pub fuzz: f64,
}
impl Metal {
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        let fuzz = fuzz.max(0.).min(1.);
        Self { albedo, fuzz }
    }

    pub fn from(a: [f64; 3], fuzz: f64) -> Self {
        Self::new(a.into(), fuzz)
    }

    pub fn scatter(&self, ray: &Ray, hit: &Hit, rng: &mut CrateRng) -> Option<Scatter> {
        let reflected = Vec3::normalized(ray.dir).reflect(hit.normal);
        let fuzz = self.fuzz * Vec3::random_in_unit_sphere(rng);
        let scattered = Ray::new(hit.point, reflected + fuzz);

        // The fuzz pushed the reflection below the surface
        if scattered.dir.dot(hit.normal) <= 0. {
            return None;
        }
        Some(Scatter::new(self.albedo, scattered))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dielectric {
    pub ref_index: f64,
}
impl Dielectric {
    pub fn new(ref_index: f64) -> Self {
        Self { ref_index }
    }

    /// Schlick's approximation of the Fresnel reflectance.
    pub fn schlick(cos: f64, ref_index: f64) -> f64 {
        let r0 = (1. - ref_index) / (1. + ref_index);
        let r0 = r0 * r0;
        r0 + (1. - r0) * (1. - cos).powi(5)
    }

    /// Whether Snell's law has no solution, forcing a reflection.
    pub fn total_internal_reflection(eta_i_over_eta_t: f64, cos_theta: f64) -> bool {
        let sin_theta = (1. - cos_theta.powi(2)).sqrt();
        eta_i_over_eta_t * sin_theta > 1.
    }

    pub fn scatter(&self, ray: &Ray, hit: &Hit, rng: &mut CrateRng) -> Option<Scatter> {
        let eta_i_over_eta_t = if hit.front_face {
            1. / self.ref_index
        } else {
            self.ref_index
        };
        let unit_dir = Vec3::normalized(ray.dir);
        let cos_theta = (-unit_dir).dot(hit.normal).min(1.0);

        let dir = if Self::total_internal_reflection(eta_i_over_eta_t, cos_theta)
            || Self::schlick(cos_theta, eta_i_over_eta_t) > rng.gen::<f64>()
        {
            unit_dir.reflect(hit.normal)
        } else {
            unit_dir.refract(hit.normal, eta_i_over_eta_t)
        };

        let scattered = Ray::new(hit.point, dir);
        Some(Scatter::new(Color::WHITE, scattered))
    }
}

/// Emits a constant color and absorbs everything that hits it.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffuseLight {
    emit: Color,
}
impl DiffuseLight {
    pub fn new(color: Color, intensity: f64) -> Self {
        Self {
            emit: color * intensity,
        }
    }

    pub fn emitted(&self) -> Color {
        self.emit
    }
}

impl From<Lambertian> for Material {
    fn from(m: Lambertian) -> Self {
        Material::Lambertian(m)
    }
}
impl From<Metal> for Material {
    fn from(m: Metal) -> Self {
        Material::Metal(m)
    }
}
impl From<Dielectric> for Material {
    fn from(m: Dielectric) -> Self {
        Material::Dielectric(m)
    }
}
impl From<DiffuseLight> for Material {
    fn from(m: DiffuseLight) -> Self {
        Material::DiffuseLight(m)
    }
}
