mod image;
mod shape;
