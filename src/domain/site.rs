//! Static marketing content: company details, services, portfolio and stats.

#[derive(Debug)]
pub struct Company {
    pub name: &'static str,
    pub tagline: &'static str,
    pub address: &'static str,
    pub phone_display: &'static str,
    pub phone_href: &'static str,
    pub email: &'static str,
    pub whatsapp_url: &'static str,
}

pub const COMPANY: Company = Company {
    name: "AKACorpTech",
    tagline: "Empowering businesses globally with custom software solutions. From clunky to custom, we transform ideas into scalable digital evolution.",
    address: "Noida, Uttar Pradesh, India",
    phone_display: "+91 7678245132",
    phone_href: "tel:+917678245132",
    email: "info@akacorptech.com",
    whatsapp_url: "https://wa.me/917678245132",
};

#[derive(Debug)]
pub struct Service {
    pub slug: &'static str,
    pub title: &'static str,
    pub short_title: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub price: &'static str,
}

impl Service {
    pub fn href(&self) -> String {
        format!("/services/{}", self.slug)
    }
}

pub const SERVICES: &[Service] = &[
    Service {
        slug: "custom-software",
        title: "Custom Software Development",
        short_title: "Custom Software",
        description: "Build enterprise-grade systems tailored to your business needs with cutting-edge technology.",
        features: &[
            "Enterprise Solutions",
            "Scalable Architecture",
            "Custom APIs",
            "Integration Services",
        ],
        price: "Starting from ₹2,50,000",
    },
    Service {
        slug: "web-development",
        title: "Web Development",
        short_title: "Web Development",
        description: "Modern, responsive websites that drive engagement and conversions.",
        features: &[
            "Responsive Design",
            "SEO Optimized",
            "Fast Loading",
            "CMS Integration",
        ],
        price: "Starting from ₹75,000",
    },
    Service {
        slug: "mobile-apps",
        title: "Mobile App Development",
        short_title: "Mobile Apps",
        description: "Native and cross-platform mobile solutions for iOS and Android.",
        features: &[
            "iOS & Android",
            "Cross-Platform",
            "App Store Deployment",
            "Maintenance",
        ],
        price: "Starting from ₹1,50,000",
    },
    Service {
        slug: "cloud-devops",
        title: "Cloud & DevOps",
        short_title: "Cloud & DevOps",
        description: "Scalable cloud infrastructure and seamless deployment pipelines.",
        features: &["AWS/Azure/GCP", "CI/CD Pipelines", "Monitoring", "Auto-scaling"],
        price: "Starting from ₹50,000",
    },
    Service {
        slug: "cybersecurity",
        title: "Cybersecurity",
        short_title: "Cybersecurity",
        description: "Comprehensive security solutions to protect your digital assets.",
        features: &[
            "Security Audits",
            "Penetration Testing",
            "Compliance",
            "24/7 Monitoring",
        ],
        price: "Starting from ₹1,00,000",
    },
    Service {
        slug: "digital-marketing",
        title: "Digital Marketing",
        short_title: "Digital Marketing",
        description: "Data-driven marketing strategies that amplify your brand reach.",
        features: &["SEO/SEM", "Social Media", "Analytics", "Content Strategy"],
        price: "Starting from ₹25,000/month",
    },
    Service {
        slug: "emerging-tech",
        title: "AI & Blockchain",
        short_title: "Emerging Tech",
        description: "Leverage cutting-edge tech for innovative solutions and competitive advantage.",
        features: &[
            "Machine Learning",
            "Smart Contracts",
            "Data Analytics",
            "Automation",
        ],
        price: "Starting from ₹3,00,000",
    },
];

pub fn service_by_slug(slug: &str) -> Option<&'static Service> {
    SERVICES.iter().find(|service| service.slug == slug)
}

#[derive(Debug)]
pub struct Project {
    pub title: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub technologies: &'static [&'static str],
    pub link: Option<&'static str>,
    pub featured: bool,
}

pub const PROJECTS: &[Project] = &[
    Project {
        title: "Stock Strategix",
        description: "Advanced stock market analysis platform with real-time data visualization and AI-powered trading insights.",
        category: "Website Design",
        technologies: &["React", "Python", "TensorFlow", "WebSocket"],
        link: Some("https://stockstrategix.com"),
        featured: true,
    },
    Project {
        title: "Crush Car",
        description: "Comprehensive automotive marketplace with advanced search, comparison tools, and dealer management system.",
        category: "Website Development",
        technologies: &["Next.js", "Node.js", "PostgreSQL", "Stripe"],
        link: Some("https://crushcar.in"),
        featured: true,
    },
    Project {
        title: "B2B International",
        description: "Enterprise-grade B2B trading platform with multi-currency support, logistics tracking, and automated workflows.",
        category: "Software Development",
        technologies: &["Vue.js", "Laravel", "Redis", "Docker"],
        link: Some("https://b2binternational.com"),
        featured: true,
    },
    Project {
        title: "E-Commerce Platform",
        description: "Full-featured e-commerce solution with inventory management, payment processing, and analytics.",
        category: "Web Application",
        technologies: &["React", "Node.js", "MongoDB", "AWS"],
        link: None,
        featured: false,
    },
    Project {
        title: "Mobile Banking App",
        description: "Secure mobile banking application with biometric authentication and real-time transactions.",
        category: "Mobile App",
        technologies: &["React Native", "Node.js", "PostgreSQL", "AWS"],
        link: None,
        featured: false,
    },
    Project {
        title: "AI Chatbot Platform",
        description: "Intelligent chatbot platform with natural language processing and machine learning capabilities.",
        category: "AI/ML",
        technologies: &["Python", "TensorFlow", "React", "FastAPI"],
        link: None,
        featured: false,
    },
];

pub fn featured_projects() -> impl Iterator<Item = &'static Project> {
    PROJECTS.iter().filter(|project| project.featured)
}

#[derive(Debug)]
pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
}

pub const HERO_STATS: &[Stat] = &[
    Stat {
        value: "50+",
        label: "Projects Delivered",
    },
    Stat {
        value: "100%",
        label: "Client Satisfaction",
    },
    Stat {
        value: "24/7",
        label: "Support",
    },
];

pub const IMPACT_STATS: &[Stat] = &[
    Stat {
        value: "50+",
        label: "Projects Completed",
    },
    Stat {
        value: "100%",
        label: "Client Satisfaction",
    },
    Stat {
        value: "24/7",
        label: "Support Available",
    },
    Stat {
        value: "5+",
        label: "Years Experience",
    },
];

#[derive(Debug)]
pub struct Link {
    pub label: &'static str,
    pub href: &'static str,
}

pub const PRIMARY_NAV: &[Link] = &[
    Link {
        label: "Home",
        href: "/",
    },
    Link {
        label: "About",
        href: "/about",
    },
    Link {
        label: "Services",
        href: "/services",
    },
    Link {
        label: "Portfolio",
        href: "/portfolio",
    },
    Link {
        label: "Blog",
        href: "/blog",
    },
    Link {
        label: "Contact",
        href: "/contact",
    },
    Link {
        label: "Admin",
        href: "/auth",
    },
];

pub const SOCIAL_LINKS: &[Link] = &[
    Link {
        label: "Facebook",
        href: "https://facebook.com/akacorptech",
    },
    Link {
        label: "LinkedIn",
        href: "https://linkedin.com/company/akacorptech",
    },
    Link {
        label: "Instagram",
        href: "https://instagram.com/akacorptech",
    },
    Link {
        label: "Twitter",
        href: "https://twitter.com/akacorptech",
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_service_slug_resolves() {
        let slugs: HashSet<_> = SERVICES.iter().map(|service| service.slug).collect();
        assert_eq!(slugs.len(), SERVICES.len());
        for slug in [
            "custom-software",
            "web-development",
            "mobile-apps",
            "cloud-devops",
            "cybersecurity",
            "digital-marketing",
            "emerging-tech",
        ] {
            assert!(service_by_slug(slug).is_some(), "missing service {slug}");
        }
        assert!(service_by_slug("quantum").is_none());
    }

    #[test]
    fn three_projects_are_featured() {
        assert_eq!(featured_projects().count(), 3);
    }
}
