//! HTTP handlers. One generic set of CRUD handlers, instantiated per resource.

mod resource;

pub use resource::{
    create, destroy, list, partial_update, retrieve, update, Ingredients, Recipes, Resource,
    Restaurants,
};
